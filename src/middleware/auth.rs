// src/middleware/auth.rs

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState, middleware::tenancy::TenantContext};

/// Exige `Authorization: Bearer <jwt>` e põe o tenant do token nas extensions.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or(AppError::InvalidToken)?;
    let tenant_id = app_state.auth_service.validate_token(token)?;

    request.extensions_mut().insert(TenantContext(tenant_id));
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
