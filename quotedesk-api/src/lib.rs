use axum::{
    extract::State,
    http::{header, HeaderName, Method},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod catalog;
pub mod error;
pub mod middleware;
pub mod quotations;
pub mod state;

use crate::error::AppError;

pub use state::{AppState, AuthConfig};

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::USER_AGENT])
        .expose_headers([
            header::CONTENT_DISPOSITION,
            HeaderName::from_static(quotations::EXPORT_WARNINGS_HEADER),
        ]);

    let v1 = Router::new()
        .merge(catalog::routes())
        .merge(quotations::routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/v1", v1)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let products = state.products.count_products().await?;
    let quotations = state.quotations.count().await?;
    Ok(Json(json!({ "status": "ok", "products": products, "quotations": quotations })))
}
