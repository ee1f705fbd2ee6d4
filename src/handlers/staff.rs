// src/handlers/staff.rs

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
    models::staff::{
        Employee, EmployeePayload, Payment, PaymentDetail, PaymentListEntry, PaymentPayload,
    },
};

// ---
// Funcionários
// ---

#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "Staff",
    responses((status = 200, description = "Funcionários", body = Vec<Employee>)),
    security(("api_jwt" = []))
)]
pub async fn list_employees(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let employees = app_state.staff_service.list_employees(tenant_id).await?;
    Ok((StatusCode::OK, Json(employees)))
}

#[utoipa::path(
    post,
    path = "/api/employees",
    tag = "Staff",
    request_body = EmployeePayload,
    responses(
        (status = 201, description = "Funcionário criado", body = Employee),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_employee(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Json(payload): Json<EmployeePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let employee = app_state.staff_service.create_employee(tenant_id, payload).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    tag = "Staff",
    request_body = EmployeePayload,
    params(("id" = Uuid, Path, description = "ID do funcionário")),
    responses(
        (status = 200, description = "Funcionário atualizado", body = Employee),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_employee(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<EmployeePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let employee = app_state.staff_service.update_employee(tenant_id, id, payload).await?;
    Ok((StatusCode::OK, Json(employee)))
}

#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    tag = "Staff",
    params(("id" = Uuid, Path, description = "ID do funcionário")),
    responses(
        (status = 204, description = "Funcionário excluído"),
        (status = 404, description = "Funcionário não encontrado"),
        (status = 409, description = "Funcionário com pagamentos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_employee(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.staff_service.delete_employee(tenant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Pagamentos
// ---

#[utoipa::path(
    get,
    path = "/api/payments",
    tag = "Staff",
    responses((status = 200, description = "Pagamentos com o nome do funcionário", body = Vec<PaymentListEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_payments(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let payments = app_state.staff_service.list_payments(tenant_id).await?;
    Ok((StatusCode::OK, Json(payments)))
}

#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    tag = "Staff",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Pagamento com os dados do funcionário", body = PaymentDetail),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_payment(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.staff_service.get_payment(tenant_id, id).await?;
    Ok((StatusCode::OK, Json(detail)))
}

#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "Staff",
    request_body = PaymentPayload,
    responses(
        (status = 201, description = "Pagamento registrado (valor líquido calculado)", body = Payment),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_payment(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Json(payload): Json<PaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let payment = app_state.staff_service.create_payment(tenant_id, payload).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

#[utoipa::path(
    delete,
    path = "/api/payments/{id}",
    tag = "Staff",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 204, description = "Pagamento excluído"),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_payment(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.staff_service.delete_payment(tenant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
