pub mod import;
pub mod pricing;
pub mod product;
pub mod repository;
pub mod search;

pub use import::{import_catalog, parse_catalog, save_catalog, CatalogImport, CatalogImportError, ImportError, ImportReport};
pub use pricing::{round_money, LineAmount, PricingCalculator, Totals};
pub use product::{NewProduct, Product, ProductAttributes, ProductId};
pub use repository::ProductRepository;
pub use search::ProductQuery;
