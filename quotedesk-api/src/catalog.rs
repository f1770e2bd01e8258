use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use quotedesk_catalog::{parse_catalog, save_catalog, ImportReport, NewProduct, Product, ProductId, ProductQuery};
use quotedesk_core::{CoreError, Identity};
use serde::Serialize;

use crate::{error::AppError, state::AppState};

const IMPORT_BODY_LIMIT: usize = 20 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub removed: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product).delete(clear_products))
        .route(
            "/products/import",
            post(import_products).layer(DefaultBodyLimit::max(IMPORT_BODY_LIMIT)),
        )
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(state.products.list_products(&query).await?))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>, AppError> {
    state
        .products
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| CoreError::not_found("Product", id).into())
}

async fn create_product(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(product): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    identity.require_admin()?;
    let product = state.products.create_product(&product).await?;
    tracing::info!(id = product.id, name = %product.name, by = %identity.username, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<ProductId>,
    Json(product): Json<NewProduct>,
) -> Result<Json<Product>, AppError> {
    identity.require_admin()?;
    Ok(Json(state.products.update_product(id, &product).await?))
}

async fn delete_product(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode, AppError> {
    identity.require_admin()?;
    state.products.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_products(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ClearResponse>, AppError> {
    identity.require_admin()?;
    let removed = state.products.clear_products().await?;
    Ok(Json(ClearResponse { removed }))
}

async fn import_products(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<Json<ImportReport>, AppError> {
    identity.require_admin()?;
    // calamine unzips and parses the whole workbook synchronously.
    let import = tokio::task::spawn_blocking(move || parse_catalog(&body))
        .await
        .map_err(|e| AppError::Internal(format!("import task failed: {}", e)))??;
    let report = save_catalog(state.products.as_ref(), import).await?;
    Ok(Json(report))
}
