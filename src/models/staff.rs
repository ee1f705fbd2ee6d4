// src/models/staff.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Funcionários ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    #[serde(default)]
    pub tenant_id: Uuid,
    pub name: String,
    #[schema(example = "123.456.789-00")]
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    #[schema(example = "Cozinheiro")]
    pub role: String,
    #[serde(with = "rust_decimal::serde::str")]
    #[schema(example = "2500.00")]
    pub base_salary: Decimal,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub name: String,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "Função é obrigatória"))]
    pub role: String,
    #[serde(default)]
    #[validate(custom(function = "crate::models::validate_not_negative", message = "Salário deve ser positivo"))]
    pub base_salary: Decimal,
}

// --- Pagamentos (folha) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    #[serde(default)]
    pub tenant_id: Uuid,
    pub employee_id: Uuid,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::str")]
    pub gross_value: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub discounts: Decimal,
    // Derivado na escrita (gross_value - discounts).
    #[serde(with = "rust_decimal::serde::str")]
    pub net_value: Decimal,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn compute_net_value(gross_value: Decimal, discounts: Decimal) -> Decimal {
        gross_value - discounts
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub employee_id: Uuid,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    #[validate(custom(function = "crate::models::validate_not_negative", message = "Valor bruto deve ser maior ou igual a 0"))]
    pub gross_value: Decimal,
    #[serde(default)]
    #[validate(custom(function = "crate::models::validate_not_negative", message = "Descontos devem ser maior ou igual a 0"))]
    pub discounts: Decimal,
}

/// Linha da listagem de pagamentos (com o nome do funcionário).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentListEntry {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::str")]
    pub gross_value: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub discounts: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub net_value: Decimal,
    pub employee_id: Uuid,
    pub employee_name: String,
}

/// Detalhe de um pagamento para o recibo.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetail {
    #[serde(flatten)]
    pub payment: Payment,
    pub employee: Employee,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn net_value_subtracts_discounts() {
        assert_eq!(Payment::compute_net_value(dec!(2500.00), dec!(275.50)), dec!(2224.50));
    }

    #[test]
    fn negative_discount_fails_validation() {
        let payload = PaymentPayload {
            employee_id: Uuid::new_v4(),
            date: Utc::now(),
            description: None,
            gross_value: dec!(100),
            discounts: dec!(-1),
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("discounts"));
    }
}
