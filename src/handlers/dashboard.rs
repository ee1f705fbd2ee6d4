// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::TenantContext,
    models::dashboard::{ChartDataPoint, DashboardMetrics, LowStockItem},
};

#[utoipa::path(
    get,
    path = "/api/dashboard/metrics",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Vendas, compras, despesas e lucro estimado do mês", body = DashboardMetrics),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_metrics(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let metrics = app_state.dashboard_service.get_metrics(tenant_id).await?;
    Ok((StatusCode::OK, Json(metrics)))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/low-stock",
    tag = "Dashboard",
    responses((status = 200, description = "Até 10 itens com estoque baixo", body = Vec<LowStockItem>)),
    security(("api_jwt" = []))
)]
pub async fn get_low_stock(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state.dashboard_service.get_low_stock(tenant_id).await?;
    Ok((StatusCode::OK, Json(items)))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/chart",
    tag = "Dashboard",
    responses((status = 200, description = "Vendas e despesas por dia nos últimos 7 dias", body = Vec<ChartDataPoint>)),
    security(("api_jwt" = []))
)]
pub async fn get_chart_data(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let points = app_state.dashboard_service.get_chart_data(tenant_id).await?;
    Ok((StatusCode::OK, Json(points)))
}
