use chrono::{DateTime, Utc};
use quotedesk_catalog::{Product, ProductId, Totals};
use quotedesk_core::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who the quotation is addressed to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerInfo {
    pub name: String,
    pub contact: String,
    #[serde(default)]
    pub address: Option<String>,
}

impl CustomerInfo {
    pub fn new(name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact: contact.into(),
            address: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut err = ValidationError::new();
        if self.name.trim().is_empty() {
            err.push("customer.name", "must not be blank");
        }
        if self.contact.trim().is_empty() {
            err.push("customer.contact", "must not be blank");
        }
        err.into_result()
    }
}

/// A requested product and quantity, before the product is looked up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selection {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// One priced row. Product details are copied so catalog edits never reach it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub line_amount: Decimal,
}

/// Priced, validated, not yet persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotationDraft {
    pub customer: CustomerInfo,
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub gst_rate: Decimal,
    pub gst_amount: Decimal,
    pub grand_total: Decimal,
}

impl QuotationDraft {
    /// Pairs each product with its computed line. `lines` and `totals.lines` share order.
    pub fn from_totals(customer: CustomerInfo, lines: &[(Product, i64)], totals: Totals) -> Self {
        let items = lines
            .iter()
            .zip(totals.lines)
            .map(|((product, _), priced)| LineItem {
                product_id: product.id,
                product_name: product.name.clone(),
                description: product.attributes.summary(),
                image_path: product.image_path.clone(),
                quantity: priced.quantity,
                unit_price: priced.unit_price,
                line_amount: priced.line_amount,
            })
            .collect();

        Self {
            customer,
            items,
            subtotal: totals.subtotal,
            gst_rate: totals.gst_rate,
            gst_amount: totals.gst_amount,
            grand_total: totals.grand_total,
        }
    }
}

/// A persisted quotation. Immutable; a re-edit produces a new one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quotation {
    pub id: Uuid,
    pub sl_no: i64,
    pub reference: String,
    pub customer: CustomerInfo,
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub gst_rate: Decimal,
    pub gst_amount: Decimal,
    pub grand_total: Decimal,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Quotation {
    pub fn reference_for(sl_no: i64) -> String {
        format!("QT-{:05}", sl_no)
    }

    pub fn from_draft(
        draft: QuotationDraft,
        sl_no: i64,
        created_by: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sl_no,
            reference: Self::reference_for(sl_no),
            customer: draft.customer,
            items: draft.items,
            subtotal: draft.subtotal,
            gst_rate: draft.gst_rate,
            gst_amount: draft.gst_amount,
            grand_total: draft.grand_total,
            created_by: created_by.into(),
            created_at,
        }
    }

    pub fn summary(&self) -> QuotationSummary {
        QuotationSummary {
            id: self.id,
            sl_no: self.sl_no,
            reference: self.reference.clone(),
            customer_name: self.customer.name.clone(),
            item_count: self.items.len() as i64,
            grand_total: self.grand_total,
            created_by: self.created_by.clone(),
            created_at: self.created_at,
        }
    }
}

/// Header-only listing row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotationSummary {
    pub id: Uuid,
    pub sl_no: i64,
    pub reference: String,
    pub customer_name: String,
    pub item_count: i64,
    pub grand_total: Decimal,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}
