// src/handlers/stock_items.rs

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
    models::stock::{StockItem, StockItemPayload},
};

#[utoipa::path(
    get,
    path = "/api/stock-items",
    tag = "Stock",
    responses((status = 200, description = "Itens de estoque", body = Vec<StockItem>)),
    security(("api_jwt" = []))
)]
pub async fn list_stock_items(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state.stock_service.list(tenant_id).await?;
    Ok((StatusCode::OK, Json(items)))
}

#[utoipa::path(
    post,
    path = "/api/stock-items",
    tag = "Stock",
    request_body = StockItemPayload,
    responses(
        (status = 201, description = "Item criado (valor total calculado)", body = StockItem),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Já existe um item com este nome")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_stock_item(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Json(payload): Json<StockItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let item = app_state.stock_service.create(tenant_id, payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    put,
    path = "/api/stock-items/{id}",
    tag = "Stock",
    request_body = StockItemPayload,
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Item atualizado (valor total recalculado)", body = StockItem),
        (status = 404, description = "Item não encontrado"),
        (status = 409, description = "Já existe um item com este nome")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_stock_item(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let item = app_state.stock_service.update(tenant_id, id, payload).await?;
    Ok((StatusCode::OK, Json(item)))
}

#[utoipa::path(
    delete,
    path = "/api/stock-items/{id}",
    tag = "Stock",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 204, description = "Item excluído"),
        (status = 404, description = "Item não encontrado"),
        (status = 409, description = "Item usado em compras")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_stock_item(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.stock_service.delete(tenant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
