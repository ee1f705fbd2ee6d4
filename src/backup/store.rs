// src/backup/store.rs
//
// Fronteira entre o motor de backup e o armazenamento.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    backup::catalog::EntityKind,
    common::error::AppError,
    models::{
        expense::{Expense, ExpenseCategory},
        purchase::{Purchase, PurchaseItem, PurchaseWithItems},
        sale::Sale,
        staff::{Employee, Payment},
        stock::StockItem,
        store::Store,
        supplier::Supplier,
    },
};

/// Um passo de inserção da restauração.
#[derive(Debug, Clone, Copy)]
pub enum InsertBatch<'a> {
    Suppliers(&'a [Supplier]),
    StockItems(&'a [StockItem]),
    /// Uma compra criada junto com os seus itens.
    Purchase {
        purchase: &'a Purchase,
        items: &'a [PurchaseItem],
    },
    Employees(&'a [Employee]),
    Payments(&'a [Payment]),
    ExpenseCategories(&'a [ExpenseCategory]),
    Expenses(&'a [Expense]),
    Sales(&'a [Sale]),
    Store(&'a Store),
}

impl InsertBatch<'_> {
    pub fn kind(&self) -> EntityKind {
        match self {
            InsertBatch::Suppliers(_) => EntityKind::Supplier,
            InsertBatch::StockItems(_) => EntityKind::StockItem,
            InsertBatch::Purchase { .. } => EntityKind::Purchase,
            InsertBatch::Employees(_) => EntityKind::Employee,
            InsertBatch::Payments(_) => EntityKind::Payment,
            InsertBatch::ExpenseCategories(_) => EntityKind::ExpenseCategory,
            InsertBatch::Expenses(_) => EntityKind::Expense,
            InsertBatch::Sales(_) => EntityKind::Sale,
            InsertBatch::Store(_) => EntityKind::Store,
        }
    }
}

/// Leituras por tenant e abertura da transação de restauração.
#[async_trait]
pub trait BackupStore: Send + Sync {
    async fn suppliers(&self, tenant_id: Uuid) -> Result<Vec<Supplier>, AppError>;
    async fn purchases(&self, tenant_id: Uuid) -> Result<Vec<PurchaseWithItems>, AppError>;
    async fn stock_items(&self, tenant_id: Uuid) -> Result<Vec<StockItem>, AppError>;
    async fn employees(&self, tenant_id: Uuid) -> Result<Vec<Employee>, AppError>;
    async fn payments(&self, tenant_id: Uuid) -> Result<Vec<Payment>, AppError>;
    async fn expense_categories(&self, tenant_id: Uuid) -> Result<Vec<ExpenseCategory>, AppError>;
    async fn expenses(&self, tenant_id: Uuid) -> Result<Vec<Expense>, AppError>;
    async fn sales(&self, tenant_id: Uuid) -> Result<Vec<Sale>, AppError>;
    async fn store(&self, tenant_id: Uuid) -> Result<Option<Store>, AppError>;

    async fn count(&self, tenant_id: Uuid, kind: EntityKind) -> Result<i64, AppError>;

    /// Abre a transação já com o lock do tenant adquirido.
    async fn begin_restore(&self, tenant_id: Uuid)
        -> Result<Box<dyn RestoreTransaction>, AppError>;
}

/// Transação atômica de restauração. Sem `commit`, nada fica gravado.
#[async_trait]
pub trait RestoreTransaction: Send {
    async fn delete_all(&mut self, kind: EntityKind) -> Result<u64, AppError>;
    async fn insert(&mut self, batch: InsertBatch<'_>) -> Result<(), AppError>;
    async fn commit(self: Box<Self>) -> Result<(), AppError>;
    async fn rollback(self: Box<Self>) -> Result<(), AppError>;
}
