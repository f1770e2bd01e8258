use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quotedesk_core::{CoreError, CoreResult};
use quotedesk_quotation::{
    CustomerInfo, LineItem, Quotation, QuotationDraft, QuotationRepository, QuotationSummary,
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{parse_decimal, persistence};

const QUOTATION_SEQUENCE: &str = "quotation";

pub struct StoreQuotationRepository {
    pool: SqlitePool,
}

impl StoreQuotationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct QuotationRow {
    sl_no: i64,
    id: String,
    reference: String,
    customer_name: String,
    customer_contact: String,
    customer_address: Option<String>,
    subtotal: String,
    gst_rate: String,
    gst_amount: String,
    grand_total: String,
    created_by: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct LineItemRow {
    product_id: i64,
    product_name: String,
    description: Option<String>,
    image_path: Option<String>,
    quantity: i64,
    unit_price: String,
    line_amount: String,
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    sl_no: i64,
    id: String,
    reference: String,
    customer_name: String,
    item_count: i64,
    grand_total: String,
    created_by: String,
    created_at: DateTime<Utc>,
}

fn parse_id(value: &str) -> CoreResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| CoreError::Persistence(format!("quotation id '{}': {}", value, e)))
}

impl TryFrom<LineItemRow> for LineItem {
    type Error = CoreError;

    fn try_from(row: LineItemRow) -> Result<Self, Self::Error> {
        Ok(LineItem {
            product_id: row.product_id,
            product_name: row.product_name,
            description: row.description,
            image_path: row.image_path,
            quantity: row.quantity,
            unit_price: parse_decimal("quotation_items.unit_price", &row.unit_price)?,
            line_amount: parse_decimal("quotation_items.line_amount", &row.line_amount)?,
        })
    }
}

impl QuotationRow {
    fn into_quotation(self, items: Vec<LineItem>) -> CoreResult<Quotation> {
        Ok(Quotation {
            id: parse_id(&self.id)?,
            sl_no: self.sl_no,
            reference: self.reference,
            customer: CustomerInfo {
                name: self.customer_name,
                contact: self.customer_contact,
                address: self.customer_address,
            },
            items,
            subtotal: parse_decimal("quotations.subtotal", &self.subtotal)?,
            gst_rate: parse_decimal("quotations.gst_rate", &self.gst_rate)?,
            gst_amount: parse_decimal("quotations.gst_amount", &self.gst_amount)?,
            grand_total: parse_decimal("quotations.grand_total", &self.grand_total)?,
            created_by: self.created_by,
            created_at: self.created_at,
        })
    }
}

impl TryFrom<SummaryRow> for QuotationSummary {
    type Error = CoreError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        Ok(QuotationSummary {
            id: parse_id(&row.id)?,
            sl_no: row.sl_no,
            reference: row.reference,
            customer_name: row.customer_name,
            item_count: row.item_count,
            grand_total: parse_decimal("quotations.grand_total", &row.grand_total)?,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl QuotationRepository for StoreQuotationRepository {
    async fn insert_quotation(&self, draft: &QuotationDraft, created_by: &str) -> CoreResult<Quotation> {
        let mut tx = self.pool.begin().await.map_err(persistence)?;

        // The counter row is write-locked until commit; a rollback gives the number back.
        let sl_no = sqlx::query_scalar::<_, i64>(
            "UPDATE sequences SET value = value + 1 WHERE name = ? RETURNING value",
        )
        .bind(QUOTATION_SEQUENCE)
        .fetch_one(&mut *tx)
        .await
        .map_err(persistence)?;

        let quotation = Quotation::from_draft(draft.clone(), sl_no, created_by, Utc::now());

        sqlx::query(
            "INSERT INTO quotations (sl_no, id, reference, customer_name, customer_contact, customer_address,
                                     subtotal, gst_rate, gst_amount, grand_total, created_by, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(quotation.sl_no)
        .bind(quotation.id.to_string())
        .bind(&quotation.reference)
        .bind(&quotation.customer.name)
        .bind(&quotation.customer.contact)
        .bind(&quotation.customer.address)
        .bind(quotation.subtotal.to_string())
        .bind(quotation.gst_rate.to_string())
        .bind(quotation.gst_amount.to_string())
        .bind(quotation.grand_total.to_string())
        .bind(&quotation.created_by)
        .bind(quotation.created_at)
        .execute(&mut *tx)
        .await
        .map_err(persistence)?;

        for (position, item) in quotation.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO quotation_items (quotation_sl_no, position, product_id, product_name, description,
                                              image_path, quantity, unit_price, line_amount)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(quotation.sl_no)
            .bind(position as i64)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(&item.description)
            .bind(&item.image_path)
            .bind(item.quantity)
            .bind(item.unit_price.to_string())
            .bind(item.line_amount.to_string())
            .execute(&mut *tx)
            .await
            .map_err(persistence)?;
        }

        tx.commit().await.map_err(persistence)?;
        Ok(quotation)
    }

    async fn get_quotation(&self, sl_no: i64) -> CoreResult<Option<Quotation>> {
        let header = sqlx::query_as::<_, QuotationRow>(
            "SELECT sl_no, id, reference, customer_name, customer_contact, customer_address,
                    subtotal, gst_rate, gst_amount, grand_total, created_by, created_at
             FROM quotations WHERE sl_no = ?",
        )
        .bind(sl_no)
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence)?;

        let Some(header) = header else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, LineItemRow>(
            "SELECT product_id, product_name, description, image_path, quantity, unit_price, line_amount
             FROM quotation_items WHERE quotation_sl_no = ? ORDER BY position",
        )
        .bind(sl_no)
        .fetch_all(&self.pool)
        .await
        .map_err(persistence)?
        .into_iter()
        .map(LineItem::try_from)
        .collect::<CoreResult<Vec<_>>>()?;

        header.into_quotation(items).map(Some)
    }

    async fn list_quotations(&self) -> CoreResult<Vec<QuotationSummary>> {
        sqlx::query_as::<_, SummaryRow>(
            "SELECT q.sl_no, q.id, q.reference, q.customer_name, q.grand_total, q.created_by, q.created_at,
                    (SELECT COUNT(*) FROM quotation_items i WHERE i.quotation_sl_no = q.sl_no) AS item_count
             FROM quotations q
             ORDER BY q.sl_no DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(persistence)?
        .into_iter()
        .map(QuotationSummary::try_from)
        .collect()
    }

    async fn delete_quotation(&self, sl_no: i64) -> CoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(persistence)?;

        sqlx::query("DELETE FROM quotation_items WHERE quotation_sl_no = ?")
            .bind(sl_no)
            .execute(&mut *tx)
            .await
            .map_err(persistence)?;

        let result = sqlx::query("DELETE FROM quotations WHERE sl_no = ?")
            .bind(sl_no)
            .execute(&mut *tx)
            .await
            .map_err(persistence)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Quotation", sl_no));
        }

        tx.commit().await.map_err(persistence)?;
        Ok(())
    }

    async fn count_quotations(&self) -> CoreResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quotations")
            .fetch_one(&self.pool)
            .await
            .map_err(persistence)
    }
}
