// src/models/supplier.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::blank_to_none;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    #[serde(default)]
    pub tenant_id: Uuid,
    #[schema(example = "Hortifruti Central")]
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub name: String,
    pub phone: Option<String>,
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    pub address: Option<String>,
}

impl SupplierPayload {
    /// Campos opcionais vazios viram NULL (o email "" não deve falhar na validação).
    pub fn normalized(self) -> Self {
        Self {
            name: self.name,
            phone: blank_to_none(self.phone),
            email: blank_to_none(self.email),
            address: blank_to_none(self.address),
        }
    }
}
