pub mod builder;
pub mod models;
pub mod repository;

pub use builder::QuotationBuilder;
pub use models::{CustomerInfo, LineItem, Quotation, QuotationDraft, QuotationSummary, Selection};
pub use repository::QuotationRepository;
