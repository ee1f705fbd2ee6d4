// src/models/store.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Perfil da loja: no máximo um registro por tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: Uuid,

    // Ignorado na importação: a restauração carimba o tenant atual.
    #[serde(default)]
    pub tenant_id: Uuid,

    #[schema(example = "Cantina da Vila")]
    pub name: String,

    #[schema(example = "12.345.678/0001-99")]
    pub tax_id: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorePayload {
    #[validate(length(min = 1, message = "Nome da loja é obrigatório"))]
    pub name: String,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}
