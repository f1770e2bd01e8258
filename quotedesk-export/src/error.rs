use rust_xlsxwriter::XlsxError;
use serde::Serialize;

/// Fatal. No document is produced.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Quotation {0} has no line items")]
    NoLineItems(String),

    #[error("Logo unavailable at {path}: {reason}")]
    Logo { path: String, reason: String },

    #[error("Workbook could not be written: {0}")]
    Workbook(#[from] XlsxError),
}

/// A line whose image could not be embedded. The document is still complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("line {line}: image {image_path} skipped ({reason})")]
pub struct ExportWarning {
    /// SL.NO of the affected row, starting at 1.
    pub line: usize,
    pub image_path: String,
    pub reason: String,
}
