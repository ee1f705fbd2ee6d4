// src/models/stock.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub id: Uuid,
    #[serde(default)]
    pub tenant_id: Uuid,

    #[schema(example = "Farinha de trigo")]
    pub name: String,
    pub description: Option<String>,

    #[schema(example = "kg")]
    pub unit: String,

    #[serde(with = "rust_decimal::serde::str")]
    #[schema(example = "3")]
    pub quantity: Decimal,

    #[serde(with = "rust_decimal::serde::str")]
    #[schema(example = "10.99")]
    pub unit_cost: Decimal,

    // Derivado na escrita (quantity × unit_cost); nunca recalculado depois.
    #[serde(with = "rust_decimal::serde::str")]
    #[schema(example = "32.97")]
    pub total_value: Decimal,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    pub fn compute_total_value(quantity: Decimal, unit_cost: Decimal) -> Decimal {
        unit_cost * quantity
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockItemPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub name: String,

    pub description: Option<String>,

    #[validate(length(min = 1, message = "Unidade é obrigatória"))]
    pub unit: String,

    #[validate(custom(function = "crate::models::validate_not_negative", message = "Quantidade inválida"))]
    pub quantity: Decimal,

    #[validate(custom(function = "crate::models::validate_not_negative", message = "Formato de preço inválido (ex: 10.99)"))]
    pub unit_cost: Decimal,
}
