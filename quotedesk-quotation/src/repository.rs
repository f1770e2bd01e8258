use async_trait::async_trait;
use quotedesk_core::CoreResult;

use crate::models::{Quotation, QuotationDraft, QuotationSummary};

#[async_trait]
pub trait QuotationRepository: Send + Sync {
    /// Reserves the next serial number and stores header and items in one transaction.
    /// On failure nothing is stored and the serial number is not consumed.
    async fn insert_quotation(&self, draft: &QuotationDraft, created_by: &str) -> CoreResult<Quotation>;
    async fn get_quotation(&self, sl_no: i64) -> CoreResult<Option<Quotation>>;
    /// Newest first.
    async fn list_quotations(&self) -> CoreResult<Vec<QuotationSummary>>;
    async fn delete_quotation(&self, sl_no: i64) -> CoreResult<()>;
    async fn count_quotations(&self) -> CoreResult<i64>;
}
