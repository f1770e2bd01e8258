use axum::{
    extract::{Path, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use quotedesk_catalog::pricing::percent_label;
use quotedesk_core::Identity;
use quotedesk_export::format_currency;
use quotedesk_quotation::{CustomerInfo, Quotation, QuotationDraft, QuotationSummary, Selection};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const EXPORT_WARNINGS_HEADER: &str = "x-export-warnings";

#[derive(Debug, Deserialize)]
pub struct QuotationRequest {
    pub customer: CustomerInfo,
    pub items: Vec<Selection>,
}

/// Totals rendered for display, e.g. `₹1,234.50`.
#[derive(Debug, Serialize)]
pub struct DisplayTotals {
    pub subtotal: String,
    pub gst_label: String,
    pub gst_amount: String,
    pub grand_total: String,
}

impl DisplayTotals {
    fn new(subtotal: Decimal, gst_rate: Decimal, gst_amount: Decimal, grand_total: Decimal, symbol: &str) -> Self {
        Self {
            subtotal: format_currency(subtotal, symbol),
            gst_label: format!("GST ({})", percent_label(gst_rate)),
            gst_amount: format_currency(gst_amount, symbol),
            grand_total: format_currency(grand_total, symbol),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WithDisplay<T> {
    #[serde(flatten)]
    pub inner: T,
    pub display: DisplayTotals,
}

fn draft_view(draft: QuotationDraft, symbol: &str) -> WithDisplay<QuotationDraft> {
    let display = DisplayTotals::new(draft.subtotal, draft.gst_rate, draft.gst_amount, draft.grand_total, symbol);
    WithDisplay { inner: draft, display }
}

fn quotation_view(quotation: Quotation, symbol: &str) -> WithDisplay<Quotation> {
    let display = DisplayTotals::new(
        quotation.subtotal,
        quotation.gst_rate,
        quotation.gst_amount,
        quotation.grand_total,
        symbol,
    );
    WithDisplay { inner: quotation, display }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/quotations", get(list_quotations).post(create_quotation))
        .route("/quotations/preview", post(preview_quotation))
        .route("/quotations/{sl_no}", get(get_quotation).delete(delete_quotation))
        .route("/quotations/{sl_no}/export", get(export_quotation))
}

async fn preview_quotation(
    State(state): State<AppState>,
    Json(request): Json<QuotationRequest>,
) -> Result<Json<WithDisplay<QuotationDraft>>, AppError> {
    let draft = state.quotations.preview(&request.customer, &request.items).await?;
    Ok(Json(draft_view(draft, state.currency_symbol())))
}

async fn create_quotation(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<QuotationRequest>,
) -> Result<(StatusCode, Json<WithDisplay<Quotation>>), AppError> {
    let quotation = state
        .quotations
        .create(&identity, &request.customer, &request.items)
        .await?;
    Ok((StatusCode::CREATED, Json(quotation_view(quotation, state.currency_symbol()))))
}

async fn list_quotations(
    State(state): State<AppState>,
) -> Result<Json<Vec<QuotationSummary>>, AppError> {
    Ok(Json(state.quotations.list().await?))
}

async fn get_quotation(
    State(state): State<AppState>,
    Path(sl_no): Path<i64>,
) -> Result<Json<WithDisplay<Quotation>>, AppError> {
    let quotation = state.quotations.get(sl_no).await?;
    Ok(Json(quotation_view(quotation, state.currency_symbol())))
}

async fn delete_quotation(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(sl_no): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.quotations.delete(&identity, sl_no).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn export_quotation(
    State(state): State<AppState>,
    Path(sl_no): Path<i64>,
) -> Result<Response, AppError> {
    let quotation = state.quotations.get(sl_no).await?;

    // Image reads and zip compression block.
    let exporter = state.exporter.clone();
    let output = tokio::task::spawn_blocking(move || exporter.export(&quotation))
        .await
        .map_err(|e| AppError::Internal(format!("export task failed: {}", e)))??;

    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", output.file_name),
        ),
        (
            HeaderName::from_static(EXPORT_WARNINGS_HEADER),
            output.warnings.len().to_string(),
        ),
    ];
    Ok((headers, output.bytes).into_response())
}
