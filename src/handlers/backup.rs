// src/handlers/backup.rs

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::TenantContext,
    models::backup::{BackupBundle, BackupSummary, RestoreReport},
};

/// Tamanho máximo aceito para o arquivo de importação.
pub const MAX_BACKUP_BYTES: usize = 10 * 1024 * 1024;

#[utoipa::path(
    get,
    path = "/api/backup/export",
    tag = "Backup",
    responses(
        (status = 200, description = "Arquivo JSON com todos os dados do usuário", body = BackupBundle),
        (status = 401, description = "Não autenticado"),
        (status = 500, description = "Falha ao exportar")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_backup(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let file = app_state.backup_service.export(tenant_id).await?;

    let headers = [
        (header::CONTENT_TYPE, "application/json".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file.file_name),
        ),
    ];
    Ok((StatusCode::OK, headers, file.content))
}

#[utoipa::path(
    post,
    path = "/api/backup/import",
    tag = "Backup",
    request_body(content = BackupBundle, description = "Arquivo gerado pela exportação", content_type = "application/json"),
    responses(
        (status = 200, description = "Dados substituídos pelo conteúdo do backup", body = RestoreReport),
        (status = 400, description = "Arquivo inválido"),
        (status = 401, description = "Não autenticado"),
        (status = 500, description = "Restauração revertida")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_backup(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    // O corpo chega cru: a validação do formato é do próprio motor de backup.
    let report = app_state.backup_service.import(tenant_id, &body).await?;
    Ok((StatusCode::OK, Json(report)))
}

#[utoipa::path(
    get,
    path = "/api/backup/summary",
    tag = "Backup",
    responses(
        (status = 200, description = "Quantidade de registros por entidade", body = BackupSummary),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_backup_summary(
    State(app_state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.backup_service.summary(tenant_id).await?;
    Ok((StatusCode::OK, Json(summary)))
}
