// src/handlers/suppliers.rs

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
    models::supplier::{Supplier, SupplierPayload},
};

#[utoipa::path(
    get,
    path = "/api/suppliers",
    tag = "Suppliers",
    responses((status = 200, description = "Fornecedores do usuário", body = Vec<Supplier>)),
    security(("api_jwt" = []))
)]
pub async fn list_suppliers(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let suppliers = app_state.supplier_service.list(tenant_id).await?;
    Ok((StatusCode::OK, Json(suppliers)))
}

#[utoipa::path(
    post,
    path = "/api/suppliers",
    tag = "Suppliers",
    request_body = SupplierPayload,
    responses(
        (status = 201, description = "Fornecedor criado", body = Supplier),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Json(payload): Json<SupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload.normalized();
    payload.validate().map_err(AppError::ValidationError)?;

    let supplier = app_state.supplier_service.create(tenant_id, payload).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

#[utoipa::path(
    delete,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    responses(
        (status = 204, description = "Fornecedor excluído"),
        (status = 404, description = "Fornecedor não encontrado"),
        (status = 409, description = "Fornecedor com compras vinculadas")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_supplier(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.supplier_service.delete(tenant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
