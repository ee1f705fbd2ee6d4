// src/models/expense.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseCategory {
    pub id: Uuid,
    #[serde(default)]
    pub tenant_id: Uuid,
    #[schema(example = "Aluguel")]
    pub name: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ExpenseCategoryPayload {
    #[validate(length(min = 1, message = "Nome da categoria é obrigatório"))]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    #[serde(default)]
    pub tenant_id: Uuid,
    pub category_id: Uuid,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::str")]
    #[schema(example = "1200.00")]
    pub value: Decimal,
    pub date: DateTime<Utc>,
    #[schema(example = "PIX")]
    pub payment_method: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePayload {
    pub category_id: Uuid,
    pub description: Option<String>,
    #[validate(custom(function = "crate::models::validate_positive", message = "Valor deve ser positivo"))]
    pub value: Decimal,
    pub date: DateTime<Utc>,
    #[validate(length(min = 1, message = "Forma de pagamento é obrigatória"))]
    pub payment_method: String,
}
