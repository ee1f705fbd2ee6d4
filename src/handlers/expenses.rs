// src/handlers/expenses.rs

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
    models::expense::{Expense, ExpenseCategory, ExpenseCategoryPayload, ExpensePayload},
};

// ---
// Categorias
// ---

#[utoipa::path(
    get,
    path = "/api/expense-categories",
    tag = "Expenses",
    responses((status = 200, description = "Categorias de despesa", body = Vec<ExpenseCategory>)),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.expense_service.list_categories(tenant_id).await?;
    Ok((StatusCode::OK, Json(categories)))
}

#[utoipa::path(
    post,
    path = "/api/expense-categories",
    tag = "Expenses",
    request_body = ExpenseCategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = ExpenseCategory),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Json(payload): Json<ExpenseCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let category = app_state.expense_service.create_category(tenant_id, payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    delete,
    path = "/api/expense-categories/{id}",
    tag = "Expenses",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 204, description = "Categoria excluída"),
        (status = 404, description = "Categoria não encontrada"),
        (status = 409, description = "Categoria com despesas associadas")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.expense_service.delete_category(tenant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Despesas
// ---

#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "Expenses",
    responses((status = 200, description = "Despesas", body = Vec<Expense>)),
    security(("api_jwt" = []))
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let expenses = app_state.expense_service.list_expenses(tenant_id).await?;
    Ok((StatusCode::OK, Json(expenses)))
}

#[utoipa::path(
    post,
    path = "/api/expenses",
    tag = "Expenses",
    request_body = ExpensePayload,
    responses(
        (status = 201, description = "Despesa registrada", body = Expense),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Json(payload): Json<ExpensePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let expense = app_state.expense_service.create_expense(tenant_id, payload).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

#[utoipa::path(
    put,
    path = "/api/expenses/{id}",
    tag = "Expenses",
    request_body = ExpensePayload,
    params(("id" = Uuid, Path, description = "ID da despesa")),
    responses(
        (status = 200, description = "Despesa atualizada", body = Expense),
        (status = 404, description = "Despesa ou categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_expense(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExpensePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let expense = app_state.expense_service.update_expense(tenant_id, id, payload).await?;
    Ok((StatusCode::OK, Json(expense)))
}

#[utoipa::path(
    delete,
    path = "/api/expenses/{id}",
    tag = "Expenses",
    params(("id" = Uuid, Path, description = "ID da despesa")),
    responses(
        (status = 204, description = "Despesa excluída"),
        (status = 404, description = "Despesa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_expense(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.expense_service.delete_expense(tenant_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
