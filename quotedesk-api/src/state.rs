use std::sync::Arc;

use quotedesk_catalog::{PricingCalculator, ProductRepository};
use quotedesk_export::{ExportTemplate, WorkbookExporter};
use quotedesk_quotation::QuotationBuilder;
use quotedesk_store::{DbClient, StoreProductRepository, StoreQuotationRepository};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub quotations: Arc<QuotationBuilder>,
    pub exporter: Arc<WorkbookExporter>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(
        db: &DbClient,
        calculator: PricingCalculator,
        template: ExportTemplate,
        auth: AuthConfig,
    ) -> Self {
        let products: Arc<dyn ProductRepository> = Arc::new(StoreProductRepository::new(db.pool.clone()));
        let quotations = Arc::new(StoreQuotationRepository::new(db.pool.clone()));

        Self {
            quotations: Arc::new(QuotationBuilder::new(calculator, products.clone(), quotations)),
            products,
            exporter: Arc::new(WorkbookExporter::new(template)),
            auth,
        }
    }

    pub fn currency_symbol(&self) -> &str {
        &self.exporter.template().currency_symbol
    }
}
