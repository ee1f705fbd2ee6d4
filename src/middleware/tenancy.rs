// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::common::error::AppError;

/// Tenant da requisição, posto pelo `auth_guard`. Todo acesso a dados usa este id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext(pub Uuid);

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Sem o guard na frente a extension não existe: trata como não autenticado.
        parts
            .extensions
            .get::<TenantContext>()
            .copied()
            .ok_or(AppError::InvalidToken)
    }
}
