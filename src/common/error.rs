use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::backup::validator::BackupValidationError;

// Código SQLSTATE do Postgres para violação de chave estrangeira
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Token inválido")]
    InvalidToken,

    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    #[error("{0}")]
    ReferentialConflict(String),

    #[error("Já existe um item com o nome '{0}'")]
    StockItemNameAlreadyExists(String),

    #[error("Backup inválido: {0}")]
    InvalidBackup(#[from] BackupValidationError),

    // A causa real fica no log; o usuário recebe só a mensagem genérica.
    #[error("Falha ao restaurar backup: {0}")]
    RestoreFailed(String),

    #[error("Falha ao exportar backup: {0}")]
    ExportFailed(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Converte violação de FK (delete de registro ainda referenciado) em conflito.
    pub fn from_delete(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) {
                return AppError::ReferentialConflict(message.to_string());
            }
        }
        err.into()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::StockItemNameAlreadyExists(_) => {
                let body = Json(json!({
                    "error": "Erro de validação",
                    "details": { "name": ["Já existe um item com este nome"] },
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::InvalidBackup(ref e) => {
                let body = Json(json!({
                    "error": "Arquivo de backup inválido",
                    "details": { "backup": [e.to_string()] },
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::ReferentialConflict(message) => (StatusCode::CONFLICT, message),
            AppError::RestoreFailed(ref cause) => {
                tracing::error!("Falha na restauração do backup: {}", cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Erro ao importar backup. Verifique se o arquivo é válido.".to_string(),
                )
            }
            AppError::ExportFailed(ref cause) => {
                tracing::error!("Falha na exportação do backup: {}", cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Erro ao exportar backup".to_string(),
                )
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let response = AppError::NotFound("Venda").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn referential_conflict_maps_to_409() {
        let response =
            AppError::ReferentialConflict("existem 3 despesa(s)".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn restore_failure_is_a_generic_500() {
        let response = AppError::RestoreFailed("duplicate key".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_backup_maps_to_400() {
        let response = AppError::InvalidBackup(BackupValidationError::MalformedJson(
            "expected value".into(),
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn non_database_errors_are_not_treated_as_fk_conflicts() {
        let err = AppError::from_delete(sqlx::Error::RowNotFound, "referenciado");
        assert!(matches!(err, AppError::DatabaseError(_)));
    }
}
