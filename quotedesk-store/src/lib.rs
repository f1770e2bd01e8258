pub mod app_config;
pub mod catalog_repo;
pub mod database;
pub mod quotation_repo;

pub use app_config::Config;
pub use catalog_repo::StoreProductRepository;
pub use database::DbClient;
pub use quotation_repo::StoreQuotationRepository;

use quotedesk_core::CoreError;
use rust_decimal::Decimal;
use std::str::FromStr;

pub(crate) fn persistence(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Database operation failed");
    CoreError::Persistence(err.to_string())
}

/// Money and rates are stored as decimal text.
pub(crate) fn parse_decimal(column: &str, value: &str) -> Result<Decimal, CoreError> {
    Decimal::from_str(value)
        .map_err(|e| CoreError::Persistence(format!("column {} holds '{}': {}", column, value, e)))
}
