// src/handlers/sales.rs

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
    models::sale::{Sale, SalePayload},
};

#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Sales",
    responses((status = 200, description = "Vendas", body = Vec<Sale>)),
    security(("api_jwt" = []))
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let sales = app_state.sale_service.list(tenant_id).await?;
    Ok((StatusCode::OK, Json(sales)))
}

#[utoipa::path(
    post,
    path = "/api/sales",
    tag = "Sales",
    request_body = SalePayload,
    responses(
        (status = 201, description = "Venda registrada", body = Sale),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Json(payload): Json<SalePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let sale = app_state.sale_service.create(tenant_id, payload).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

#[utoipa::path(
    put,
    path = "/api/sales/{id}",
    tag = "Sales",
    request_body = SalePayload,
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda atualizada", body = Sale),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_sale(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<SalePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let sale = app_state.sale_service.update(tenant_id, id, payload).await?;
    Ok((StatusCode::OK, Json(sale)))
}

#[utoipa::path(
    delete,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID da venda")),
    responses(
        (status = 204, description = "Venda excluída"),
        (status = 404, description = "Venda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_sale(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.sale_service.delete(tenant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
