// src/models/backup.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{
    expense::{Expense, ExpenseCategory},
    purchase::PurchaseWithItems,
    sale::Sale,
    staff::{Employee, Payment},
    stock::StockItem,
    store::Store,
    supplier::Supplier,
};

/// Versão atual do formato de backup.
pub const BACKUP_FORMAT_VERSION: &str = "1.0.0";

/// Snapshot versionado de todos os dados de um tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackupBundle {
    #[schema(example = "1.0.0")]
    pub version: String,

    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,

    // Informativo: a restauração sempre usa o tenant da sessão.
    #[serde(rename = "userId", alias = "tenantId", default)]
    pub tenant_id: Option<String>,

    pub data: BackupData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
    #[serde(default)]
    pub purchases: Vec<PurchaseWithItems>,
    #[serde(default)]
    pub stock_items: Vec<StockItem>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub expense_categories: Vec<ExpenseCategory>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub sales: Vec<Sale>,
    #[serde(default)]
    pub store: Option<Store>,
}

/// Contagens por entidade exibidas na tela de backup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackupSummary {
    pub suppliers: i64,
    pub purchases: i64,
    pub stock_items: i64,
    pub employees: i64,
    pub payments: i64,
    pub expenses: i64,
    pub sales: i64,
}

/// Quantas linhas de cada tipo foram recriadas numa restauração.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    pub suppliers: usize,
    pub stock_items: usize,
    pub purchases: usize,
    pub purchase_items: usize,
    pub employees: usize,
    pub payments: usize,
    pub expense_categories: usize,
    pub expenses: usize,
    pub sales: usize,
    pub store: bool,
}
