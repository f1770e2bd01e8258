use async_trait::async_trait;
use quotedesk_core::CoreResult;

use crate::product::{NewProduct, Product, ProductId};
use crate::search::ProductQuery;

/// Catalog persistence seam.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create_product(&self, product: &NewProduct) -> CoreResult<Product>;

    /// Inserts all rows in one transaction.
    async fn create_products(&self, products: &[NewProduct]) -> CoreResult<Vec<Product>>;

    async fn get_product(&self, id: ProductId) -> CoreResult<Option<Product>>;

    async fn list_products(&self, query: &ProductQuery) -> CoreResult<Vec<Product>>;

    async fn update_product(&self, id: ProductId, product: &NewProduct) -> CoreResult<Product>;

    async fn delete_product(&self, id: ProductId) -> CoreResult<()>;

    /// Removes every product, returning how many were deleted.
    async fn clear_products(&self) -> CoreResult<u64>;

    async fn count_products(&self) -> CoreResult<i64>;
}
