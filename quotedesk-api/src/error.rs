use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quotedesk_catalog::CatalogImportError;
use quotedesk_core::{CoreError, ValidationError};
use quotedesk_export::ExportError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required: {0}")]
    Unauthenticated(String),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Import(#[from] CatalogImportError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Core(CoreError::Validation(err))
    }
}

fn core_response(err: CoreError) -> Response {
    match err {
        CoreError::Validation(v) => {
            let body = Json(json!({
                "error": v.to_string(),
                "issues": v.issues,
            }));
            (StatusCode::BAD_REQUEST, body).into_response()
        }
        CoreError::NotFound { .. } => message(StatusCode::NOT_FOUND, err.to_string()),
        CoreError::Forbidden(msg) => message(StatusCode::FORBIDDEN, msg),
        CoreError::Persistence(msg) => internal(msg),
    }
}

fn message(status: StatusCode, error: String) -> Response {
    (status, Json(json!({ "error": error }))).into_response()
}

fn internal(detail: String) -> Response {
    tracing::error!("Internal Server Error: {}", detail);
    message(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthenticated(msg) => message(StatusCode::UNAUTHORIZED, msg),
            AppError::Core(err) => core_response(err),
            AppError::Import(CatalogImportError::Store(err)) => core_response(err),
            AppError::Import(err) => message(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            AppError::Export(ExportError::Workbook(err)) => internal(err.to_string()),
            AppError::Export(err) => message(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            AppError::Internal(msg) => internal(msg),
        }
    }
}
