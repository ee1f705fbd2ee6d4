// src/models/sale.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    #[serde(default)]
    pub tenant_id: Uuid,
    pub date: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::str")]
    #[schema(example = "350.00")]
    pub total_value: Decimal,
    #[schema(example = "CARTAO")]
    pub payment_method: String,
    pub notes: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalePayload {
    pub date: DateTime<Utc>,
    #[validate(custom(function = "crate::models::validate_positive", message = "Valor total deve ser positivo"))]
    pub total_value: Decimal,
    #[validate(length(min = 1, message = "Forma de pagamento é obrigatória"))]
    pub payment_method: String,
    pub notes: Option<String>,
}
