// src/models/dashboard.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// 1. Totais do mês corrente (os cards do topo)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub sales_month: Decimal,
    pub purchases_month: Decimal,
    pub expenses_month: Decimal,
    pub estimated_profit: Decimal, // vendas - (compras + despesas)
}

impl DashboardMetrics {
    pub fn from_totals(sales: Decimal, purchases: Decimal, expenses: Decimal) -> Self {
        Self {
            sales_month: sales,
            purchases_month: purchases,
            expenses_month: expenses,
            estimated_profit: sales - (purchases + expenses),
        }
    }
}

// 2. Itens com estoque baixo
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    pub unit: String,
}

// 3. Série diária do gráfico (vendas x despesas)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataPoint {
    #[schema(example = "2025-02-14")]
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    #[schema(example = "350.00")]
    pub sales: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    #[schema(example = "120.00")]
    pub expenses: Decimal,
}

/// Soma de um dia (UTC) lida do banco.
#[derive(Debug, Clone, Copy, PartialEq, FromRow)]
pub struct DailyTotal {
    pub day: NaiveDate,
    pub total: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn profit_discounts_purchases_and_expenses() {
        let metrics = DashboardMetrics::from_totals(dec!(1000.00), dec!(350.50), dec!(200.00));
        assert_eq!(metrics.estimated_profit, dec!(449.50));
    }

    #[test]
    fn profit_can_be_negative() {
        let metrics = DashboardMetrics::from_totals(dec!(0), dec!(10), dec!(5));
        assert_eq!(metrics.estimated_profit, dec!(-15));
    }
}
