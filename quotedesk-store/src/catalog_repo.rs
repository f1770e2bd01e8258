use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quotedesk_catalog::{NewProduct, Product, ProductAttributes, ProductId, ProductQuery, ProductRepository};
use quotedesk_core::{CoreError, CoreResult};
use sqlx::SqlitePool;

use crate::{parse_decimal, persistence};

const PRODUCT_COLUMNS: &str = "id, name, unit_price, image_path, body_colour, watt, size, \
                               beam_angle, cut_out, created_at, updated_at";

const INSERT_PRODUCT: &str = "INSERT INTO products (name, unit_price, image_path, body_colour, watt, size, \
                              beam_angle, cut_out, created_at, updated_at)
                              VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                              RETURNING id, name, unit_price, image_path, body_colour, watt, size, \
                              beam_angle, cut_out, created_at, updated_at";

pub struct StoreProductRepository {
    pool: SqlitePool,
}

impl StoreProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    unit_price: String,
    image_path: Option<String>,
    body_colour: Option<String>,
    watt: Option<String>,
    size: Option<String>,
    beam_angle: Option<String>,
    cut_out: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = CoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: row.id,
            name: row.name,
            unit_price: parse_decimal("products.unit_price", &row.unit_price)?,
            image_path: row.image_path,
            attributes: ProductAttributes {
                body_colour: row.body_colour,
                watt: row.watt,
                size: row.size,
                beam_angle: row.beam_angle,
                cut_out: row.cut_out,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn prepare(product: &NewProduct) -> CoreResult<NewProduct> {
    let product = product.clone().normalized();
    product.validate()?;
    Ok(product)
}

async fn insert<'e, E>(executor: E, product: &NewProduct, now: DateTime<Utc>) -> Result<ProductRow, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query_as::<_, ProductRow>(INSERT_PRODUCT)
        .bind(&product.name)
        .bind(product.unit_price.to_string())
        .bind(&product.image_path)
        .bind(&product.attributes.body_colour)
        .bind(&product.attributes.watt)
        .bind(&product.attributes.size)
        .bind(&product.attributes.beam_angle)
        .bind(&product.attributes.cut_out)
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await
}

#[async_trait]
impl ProductRepository for StoreProductRepository {
    async fn create_product(&self, product: &NewProduct) -> CoreResult<Product> {
        let product = prepare(product)?;
        let row = insert(&self.pool, &product, Utc::now()).await.map_err(persistence)?;
        row.try_into()
    }

    async fn create_products(&self, products: &[NewProduct]) -> CoreResult<Vec<Product>> {
        let prepared = products.iter().map(prepare).collect::<CoreResult<Vec<_>>>()?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(persistence)?;
        let mut rows = Vec::with_capacity(prepared.len());
        for product in &prepared {
            rows.push(insert(&mut *tx, product, now).await.map_err(persistence)?);
        }
        tx.commit().await.map_err(persistence)?;

        tracing::info!(count = rows.len(), "Products created");
        rows.into_iter().map(Product::try_from).collect()
    }

    async fn get_product(&self, id: ProductId) -> CoreResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?", PRODUCT_COLUMNS);
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence)?;

        row.map(Product::try_from).transpose()
    }

    async fn list_products(&self, query: &ProductQuery) -> CoreResult<Vec<Product>> {
        let mut sql = format!("SELECT {} FROM products WHERE 1=1", PRODUCT_COLUMNS);
        let mut bindings: Vec<String> = Vec::new();

        if let Some(pattern) = query.like_pattern() {
            sql.push_str(
                " AND (lower(name) LIKE ?1 ESCAPE '\\'
                    OR lower(coalesce(body_colour, '')) LIKE ?1 ESCAPE '\\'
                    OR lower(coalesce(watt, '')) LIKE ?1 ESCAPE '\\'
                    OR lower(coalesce(size, '')) LIKE ?1 ESCAPE '\\')",
            );
            bindings.push(pattern);
        }

        for (column, value) in query.filters() {
            sql.push_str(&format!(" AND {} = ?{}", column, bindings.len() + 1));
            bindings.push(value);
        }

        sql.push_str(" ORDER BY name COLLATE NOCASE, id");

        let mut rows = sqlx::query_as::<_, ProductRow>(&sql);
        for value in bindings {
            rows = rows.bind(value);
        }
        let rows = rows.fetch_all(&self.pool).await.map_err(persistence)?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn update_product(&self, id: ProductId, product: &NewProduct) -> CoreResult<Product> {
        let product = prepare(product)?;
        let sql = format!(
            "UPDATE products
             SET name = ?, unit_price = ?, image_path = ?, body_colour = ?, watt = ?, size = ?,
                 beam_angle = ?, cut_out = ?, updated_at = ?
             WHERE id = ?
             RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&product.name)
            .bind(product.unit_price.to_string())
            .bind(&product.image_path)
            .bind(&product.attributes.body_colour)
            .bind(&product.attributes.watt)
            .bind(&product.attributes.size)
            .bind(&product.attributes.beam_angle)
            .bind(&product.attributes.cut_out)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence)?;

        row.ok_or_else(|| CoreError::not_found("Product", id))?.try_into()
    }

    async fn delete_product(&self, id: ProductId) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(persistence)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Product", id));
        }
        Ok(())
    }

    async fn clear_products(&self) -> CoreResult<u64> {
        let result = sqlx::query("DELETE FROM products")
            .execute(&self.pool)
            .await
            .map_err(persistence)?;

        tracing::warn!(removed = result.rows_affected(), "Catalog cleared");
        Ok(result.rows_affected())
    }

    async fn count_products(&self) -> CoreResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await
            .map_err(persistence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbClient;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    async fn repo() -> StoreProductRepository {
        let db = DbClient::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        StoreProductRepository::new(db.pool)
    }

    fn spot(name: &str, price: &str) -> NewProduct {
        NewProduct::new(name, Decimal::from_str(price).unwrap())
            .with_image(format!("{}.png", name))
            .with_attributes(ProductAttributes {
                body_colour: Some("Black".to_string()),
                watt: Some("12".to_string()),
                ..Default::default()
            })
    }

    #[tokio::test]
    async fn test_create_and_get_keeps_exact_price() {
        let repo = repo().await;
        let created = repo.create_product(&spot("COB-12", "1250.50")).await.unwrap();

        let fetched = repo.get_product(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "COB-12");
        assert_eq!(fetched.unit_price, Decimal::from_str("1250.50").unwrap());
        assert_eq!(fetched.attributes.watt.as_deref(), Some("12"));
        assert_eq!(fetched.image_path.as_deref(), Some("COB-12.png"));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_product() {
        let repo = repo().await;
        let err = repo
            .create_product(&NewProduct::new(" ", Decimal::from(-1)))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(repo.count_products().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_matches_name_and_attributes() {
        let repo = repo().await;
        repo.create_products(&[spot("Downlight", "300"), spot("Track Spot", "450")])
            .await
            .unwrap();
        let mut white = NewProduct::new("Panel", Decimal::from(900));
        white.attributes.body_colour = Some("White".to_string());
        repo.create_product(&white).await.unwrap();

        let hits = repo.list_products(&ProductQuery::search("SPOT")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Track Spot");

        let hits = repo.list_products(&ProductQuery::search("white")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Panel");

        let all = repo.list_products(&ProductQuery::search("%")).await.unwrap();
        let names: Vec<&str> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Downlight", "Panel", "Track Spot"]);
    }

    #[tokio::test]
    async fn test_underscore_is_not_a_wildcard() {
        let repo = repo().await;
        repo.create_products(&[spot("Axb", "10"), spot("A_B", "20")]).await.unwrap();

        let hits = repo.list_products(&ProductQuery::search("a_b")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "A_B");
    }

    #[tokio::test]
    async fn test_attribute_filters_are_exact_and_combined() {
        let repo = repo().await;
        let mut white_12 = spot("Downlight White", "300");
        white_12.attributes.body_colour = Some("White".to_string());
        let mut white_18 = spot("Panel White", "900");
        white_18.attributes.body_colour = Some("White".to_string());
        white_18.attributes.watt = Some("18".to_string());
        white_18.attributes.beam_angle = Some("120".to_string());
        repo.create_products(&[white_12, white_18, spot("Track Spot", "450")])
            .await
            .unwrap();

        let white = ProductQuery {
            body_colour: Some("White".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.list_products(&white).await.unwrap().len(), 2);

        let white_18 = ProductQuery {
            watt: Some("18".to_string()),
            ..white.clone()
        };
        let hits = repo.list_products(&white_18).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Panel White");

        // exact match, not a substring
        let partial = ProductQuery {
            watt: Some("1".to_string()),
            ..Default::default()
        };
        assert!(repo.list_products(&partial).await.unwrap().is_empty());

        let searched = ProductQuery {
            search: Some("spot".to_string()),
            body_colour: Some("Black".to_string()),
            ..Default::default()
        };
        let hits = repo.list_products(&searched).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Track Spot");
    }

    #[tokio::test]
    async fn test_update_delete_and_clear() {
        let repo = repo().await;
        let product = repo.create_product(&spot("Strip", "99")).await.unwrap();

        let updated = repo
            .update_product(product.id, &spot("Strip 5m", "120"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Strip 5m");
        assert_eq!(updated.unit_price, Decimal::from(120));
        assert_eq!(updated.created_at, product.created_at);

        assert!(matches!(
            repo.update_product(9999, &spot("Ghost", "1")).await,
            Err(CoreError::NotFound { .. })
        ));

        repo.delete_product(product.id).await.unwrap();
        assert!(matches!(
            repo.delete_product(product.id).await,
            Err(CoreError::NotFound { .. })
        ));

        repo.create_products(&[spot("A", "1"), spot("B", "2")]).await.unwrap();
        assert_eq!(repo.clear_products().await.unwrap(), 2);
        assert_eq!(repo.count_products().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_bulk_create_is_all_or_nothing() {
        let repo = repo().await;
        let err = repo
            .create_products(&[spot("Good", "10"), NewProduct::new("", Decimal::ONE)])
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(repo.count_products().await.unwrap(), 0);
    }
}
