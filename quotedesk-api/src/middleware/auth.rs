use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use quotedesk_core::{Identity, Role};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

/// Claims issued by the upstream auth service.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

/// Verifies the bearer token and stores the caller's `Identity` in request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthenticated("missing bearer token".to_string()))?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Unauthenticated(format!("invalid token: {}", e)))?;

    let role: Role = token_data.claims.role.parse()?;
    let identity = Identity::new(token_data.claims.sub, role);
    tracing::debug!(user = %identity.username, role = %identity.role, "Authenticated request");

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
