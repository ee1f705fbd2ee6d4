// src/models/purchase.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: Uuid,
    #[serde(default)]
    pub tenant_id: Uuid,
    pub supplier_id: Uuid,
    pub date: DateTime<Utc>,
    pub payment_method: String,
    pub notes: Option<String>,
    // Soma dos totais dos itens no momento da criação.
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Item de compra: pertence a exatamente uma compra e não existe sozinho.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub id: Uuid,
    #[serde(default)]
    pub tenant_id: Uuid,
    // Na importação o pai vem do aninhamento, não deste campo.
    #[serde(default)]
    pub purchase_id: Uuid,
    pub stock_item_id: Uuid,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl PurchaseItem {
    pub fn compute_total(quantity: Decimal, unit_price: Decimal) -> Decimal {
        unit_price * quantity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseWithItems {
    #[serde(flatten)]
    pub purchase: Purchase,
    #[serde(default)]
    pub items: Vec<PurchaseItem>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItemPayload {
    pub stock_item_id: Uuid,
    #[validate(custom(function = "crate::models::validate_positive", message = "Quantidade deve ser maior que 0"))]
    pub quantity: Decimal,
    #[validate(custom(function = "crate::models::validate_not_negative", message = "Formato de preço inválido"))]
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchasePayload {
    pub supplier_id: Uuid,
    pub date: DateTime<Utc>,
    #[validate(length(min = 1, message = "Forma de pagamento é obrigatória"))]
    pub payment_method: String,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "Adicione pelo menos um item"), nested)]
    pub items: Vec<PurchaseItemPayload>,
}

impl PurchasePayload {
    /// Total da compra = soma exata dos totais dos itens.
    pub fn compute_total(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| PurchaseItem::compute_total(item.quantity, item.unit_price))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(quantity: Decimal, unit_price: Decimal) -> PurchaseItemPayload {
        PurchaseItemPayload { stock_item_id: Uuid::new_v4(), quantity, unit_price }
    }

    #[test]
    fn purchase_total_is_the_sum_of_item_totals() {
        let payload = PurchasePayload {
            supplier_id: Uuid::new_v4(),
            date: Utc::now(),
            payment_method: "PIX".into(),
            notes: None,
            items: vec![item(dec!(3), dec!(10.99)), item(dec!(0.5), dec!(7.30))],
        };
        assert_eq!(payload.compute_total(), dec!(36.62));
    }

    #[test]
    fn purchase_without_items_is_invalid() {
        let payload = PurchasePayload {
            supplier_id: Uuid::new_v4(),
            date: Utc::now(),
            payment_method: "PIX".into(),
            notes: None,
            items: vec![],
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn nested_items_are_validated() {
        let payload = PurchasePayload {
            supplier_id: Uuid::new_v4(),
            date: Utc::now(),
            payment_method: "PIX".into(),
            notes: None,
            items: vec![item(dec!(0), dec!(1.00))],
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn nested_items_deserialize_under_the_flattened_purchase() {
        let raw = r#"{
            "id": "1b4e28ba-2fa1-11d2-883f-0016d3cca427",
            "supplierId": "2b4e28ba-2fa1-11d2-883f-0016d3cca427",
            "date": "2024-05-01T10:00:00.000Z",
            "paymentMethod": "PIX",
            "notes": null,
            "total": "20.00",
            "items": [{
                "id": "3b4e28ba-2fa1-11d2-883f-0016d3cca427",
                "purchaseId": "9b4e28ba-2fa1-11d2-883f-0016d3cca427",
                "stockItemId": "4b4e28ba-2fa1-11d2-883f-0016d3cca427",
                "quantity": "2",
                "unitPrice": "10.00",
                "total": "20.00"
            }]
        }"#;
        let parsed: PurchaseWithItems = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.purchase.total, dec!(20.00));
    }
}
