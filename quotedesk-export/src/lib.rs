pub mod currency;
pub mod error;
pub mod workbook;

pub use currency::format_currency;
pub use error::{ExportError, ExportWarning};
pub use workbook::{ExportOutput, ExportTemplate, WorkbookExporter};
