// src/handlers/purchases.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::TenantContext,
    models::purchase::{PurchasePayload, PurchaseWithItems},
};

#[utoipa::path(
    get,
    path = "/api/purchases",
    tag = "Purchases",
    responses((status = 200, description = "Compras com os itens", body = Vec<PurchaseWithItems>)),
    security(("api_jwt" = []))
)]
pub async fn list_purchases(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let purchases = app_state.purchase_service.list(tenant_id).await?;
    Ok((StatusCode::OK, Json(purchases)))
}

#[utoipa::path(
    post,
    path = "/api/purchases",
    tag = "Purchases",
    request_body = PurchasePayload,
    responses(
        (status = 201, description = "Compra registrada (totais calculados)", body = PurchaseWithItems),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Fornecedor ou item de estoque não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_purchase(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Json(payload): Json<PurchasePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let purchase = app_state.purchase_service.create(tenant_id, payload).await?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

#[utoipa::path(
    delete,
    path = "/api/purchases/{id}",
    tag = "Purchases",
    params(("id" = Uuid, Path, description = "ID da compra")),
    responses(
        (status = 204, description = "Compra e itens excluídos"),
        (status = 404, description = "Compra não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_purchase(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.purchase_service.delete(tenant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
