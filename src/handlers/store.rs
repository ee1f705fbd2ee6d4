// src/handlers/store.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::TenantContext,
    models::store::{Store, StorePayload},
};

#[utoipa::path(
    get,
    path = "/api/store",
    tag = "Store",
    responses((status = 200, description = "Dados da loja (null se ainda não cadastrada)", body = Store)),
    security(("api_jwt" = []))
)]
pub async fn get_store(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let store = app_state.store_service.get(tenant_id).await?;
    Ok((StatusCode::OK, Json(store)))
}

#[utoipa::path(
    put,
    path = "/api/store",
    tag = "Store",
    request_body = StorePayload,
    responses(
        (status = 200, description = "Dados da loja salvos", body = Store),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn save_store(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Json(payload): Json<StorePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let store = app_state.store_service.save(tenant_id, payload).await?;
    Ok((StatusCode::OK, Json(store)))
}
