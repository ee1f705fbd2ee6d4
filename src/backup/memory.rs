// src/backup/memory.rs
//
// Armazenamento em memória para os testes do motor de backup. Imita o que o
// Postgres garante: chaves estrangeiras, unicidade, RLS e rollback.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    backup::{
        catalog::{EntityKind, DELETE_ORDER},
        store::{BackupStore, InsertBatch, RestoreTransaction},
    },
    common::error::AppError,
    models::{
        backup::BackupData,
        expense::{Expense, ExpenseCategory},
        purchase::{Purchase, PurchaseItem, PurchaseWithItems},
        sale::Sale,
        staff::{Employee, Payment},
        stock::StockItem,
        store::Store,
        supplier::Supplier,
    },
};

fn violation(message: impl Into<String>) -> AppError {
    AppError::DatabaseError(sqlx::Error::Protocol(message.into()))
}

/// As tabelas de um tenant.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TenantTables {
    pub suppliers: Vec<Supplier>,
    pub stock_items: Vec<StockItem>,
    pub purchases: Vec<Purchase>,
    pub purchase_items: Vec<PurchaseItem>,
    pub employees: Vec<Employee>,
    pub payments: Vec<Payment>,
    pub expense_categories: Vec<ExpenseCategory>,
    pub expenses: Vec<Expense>,
    pub sales: Vec<Sale>,
    pub store: Option<Store>,
}

impl TenantTables {
    fn from_data(data: BackupData) -> Self {
        let mut tables = TenantTables {
            suppliers: data.suppliers,
            stock_items: data.stock_items,
            employees: data.employees,
            payments: data.payments,
            expense_categories: data.expense_categories,
            expenses: data.expenses,
            sales: data.sales,
            store: data.store,
            ..Default::default()
        };
        for entry in data.purchases {
            tables.purchases.push(entry.purchase);
            tables.purchase_items.extend(entry.items);
        }
        tables
    }

    fn len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Store => usize::from(self.store.is_some()),
            EntityKind::Supplier => self.suppliers.len(),
            EntityKind::StockItem => self.stock_items.len(),
            EntityKind::Employee => self.employees.len(),
            EntityKind::Payment => self.payments.len(),
            EntityKind::ExpenseCategory => self.expense_categories.len(),
            EntityKind::Expense => self.expenses.len(),
            EntityKind::Sale => self.sales.len(),
            EntityKind::Purchase => self.purchases.len(),
            EntityKind::PurchaseItem => self.purchase_items.len(),
        }
    }

    fn purchases_with_items(&self) -> Vec<PurchaseWithItems> {
        self.purchases
            .iter()
            .map(|purchase| PurchaseWithItems {
                purchase: purchase.clone(),
                items: self
                    .purchase_items
                    .iter()
                    .filter(|item| item.purchase_id == purchase.id)
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    // Compra apaga os próprios itens (ON DELETE CASCADE); os demais pais bloqueiam.
    fn has_children_of(&self, kind: EntityKind) -> bool {
        DELETE_ORDER.iter().any(|child| {
            child.parents().contains(&kind)
                && !(kind == EntityKind::Purchase && *child == EntityKind::PurchaseItem)
                && self.len(*child) > 0
        })
    }
}

#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    tenants: Arc<Mutex<HashMap<Uuid, TenantTables>>>,
    fail_on: Option<EntityKind>,
    fail_reads: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Toda inserção desse tipo falha dentro da transação.
    pub fn failing_on(mut self, kind: EntityKind) -> Self {
        self.fail_on = Some(kind);
        self
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub async fn seed(&self, tenant_id: Uuid, data: BackupData) {
        self.tenants
            .lock()
            .await
            .insert(tenant_id, TenantTables::from_data(data));
    }

    pub async fn tables(&self, tenant_id: Uuid) -> TenantTables {
        self.tenants
            .lock()
            .await
            .get(&tenant_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn read<T>(
        &self,
        tenant_id: Uuid,
        pick: impl FnOnce(&TenantTables) -> T,
    ) -> Result<T, AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(violation("conexão perdida"));
        }
        let tenants = self.tenants.lock().await;
        let empty = TenantTables::default();
        Ok(pick(tenants.get(&tenant_id).unwrap_or(&empty)))
    }
}

#[async_trait]
impl BackupStore for MemoryStore {
    async fn suppliers(&self, tenant_id: Uuid) -> Result<Vec<Supplier>, AppError> {
        self.read(tenant_id, |t| t.suppliers.clone()).await
    }

    async fn purchases(&self, tenant_id: Uuid) -> Result<Vec<PurchaseWithItems>, AppError> {
        self.read(tenant_id, TenantTables::purchases_with_items).await
    }

    async fn stock_items(&self, tenant_id: Uuid) -> Result<Vec<StockItem>, AppError> {
        self.read(tenant_id, |t| t.stock_items.clone()).await
    }

    async fn employees(&self, tenant_id: Uuid) -> Result<Vec<Employee>, AppError> {
        self.read(tenant_id, |t| t.employees.clone()).await
    }

    async fn payments(&self, tenant_id: Uuid) -> Result<Vec<Payment>, AppError> {
        self.read(tenant_id, |t| t.payments.clone()).await
    }

    async fn expense_categories(&self, tenant_id: Uuid) -> Result<Vec<ExpenseCategory>, AppError> {
        self.read(tenant_id, |t| t.expense_categories.clone()).await
    }

    async fn expenses(&self, tenant_id: Uuid) -> Result<Vec<Expense>, AppError> {
        self.read(tenant_id, |t| t.expenses.clone()).await
    }

    async fn sales(&self, tenant_id: Uuid) -> Result<Vec<Sale>, AppError> {
        self.read(tenant_id, |t| t.sales.clone()).await
    }

    async fn store(&self, tenant_id: Uuid) -> Result<Option<Store>, AppError> {
        self.read(tenant_id, |t| t.store.clone()).await
    }

    async fn count(&self, tenant_id: Uuid, kind: EntityKind) -> Result<i64, AppError> {
        self.read(tenant_id, |t| t.len(kind) as i64).await
    }

    async fn begin_restore(
        &self,
        tenant_id: Uuid,
    ) -> Result<Box<dyn RestoreTransaction>, AppError> {
        // O guard faz o papel do advisory lock: uma restauração por vez.
        let guard = Arc::clone(&self.tenants).lock_owned().await;
        let working = guard.get(&tenant_id).cloned().unwrap_or_default();
        Ok(Box::new(MemoryRestoreTx {
            guard,
            tenant_id,
            working,
            fail_on: self.fail_on,
        }))
    }
}

struct MemoryRestoreTx {
    guard: OwnedMutexGuard<HashMap<Uuid, TenantTables>>,
    tenant_id: Uuid,
    // Cópia de trabalho: só vai para o mapa no commit.
    working: TenantTables,
    fail_on: Option<EntityKind>,
}

impl MemoryRestoreTx {
    fn check_tenant(&self, kind: EntityKind, tenant_id: Uuid) -> Result<(), AppError> {
        if tenant_id != self.tenant_id {
            return Err(violation(format!(
                "new row violates row-level security policy for table \"{}\"",
                kind.table()
            )));
        }
        Ok(())
    }

    fn check_new_ids<'a>(
        kind: EntityKind,
        existing: impl Iterator<Item = Uuid>,
        incoming: impl Iterator<Item = &'a Uuid>,
    ) -> Result<(), AppError> {
        let mut seen: HashSet<Uuid> = existing.collect();
        for id in incoming {
            if !seen.insert(*id) {
                return Err(violation(format!("duplicate key in {}: {id}", kind.table())));
            }
        }
        Ok(())
    }

    fn check_parent(kind: EntityKind, exists: bool, parent_id: Uuid) -> Result<(), AppError> {
        if !exists {
            return Err(violation(format!(
                "insert on {} violates foreign key ({parent_id})",
                kind.table()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RestoreTransaction for MemoryRestoreTx {
    async fn delete_all(&mut self, kind: EntityKind) -> Result<u64, AppError> {
        if self.working.has_children_of(kind) {
            return Err(violation(format!(
                "delete on {} violates foreign key constraint",
                kind.table()
            )));
        }
        let removed = self.working.len(kind) as u64;
        let w = &mut self.working;
        match kind {
            EntityKind::Store => w.store = None,
            EntityKind::Supplier => w.suppliers.clear(),
            EntityKind::StockItem => w.stock_items.clear(),
            EntityKind::Employee => w.employees.clear(),
            EntityKind::Payment => w.payments.clear(),
            EntityKind::ExpenseCategory => w.expense_categories.clear(),
            EntityKind::Expense => w.expenses.clear(),
            EntityKind::Sale => w.sales.clear(),
            EntityKind::PurchaseItem => w.purchase_items.clear(),
            // ON DELETE CASCADE
            EntityKind::Purchase => {
                w.purchases.clear();
                w.purchase_items.clear();
            }
        }
        Ok(removed)
    }

    async fn insert(&mut self, batch: InsertBatch<'_>) -> Result<(), AppError> {
        let kind = batch.kind();
        if self.fail_on == Some(kind) {
            return Err(violation(format!("falha simulada em {}", kind.table())));
        }

        match batch {
            InsertBatch::Suppliers(rows) => {
                for row in rows {
                    self.check_tenant(kind, row.tenant_id)?;
                }
                let existing = self.working.suppliers.iter().map(|r| r.id);
                Self::check_new_ids(kind, existing, rows.iter().map(|r| &r.id))?;
                self.working.suppliers.extend_from_slice(rows);
            }
            InsertBatch::StockItems(rows) => {
                let mut names: HashSet<&str> =
                    self.working.stock_items.iter().map(|r| r.name.as_str()).collect();
                for row in rows {
                    self.check_tenant(kind, row.tenant_id)?;
                    if !names.insert(row.name.as_str()) {
                        return Err(violation(format!(
                            "duplicate key value violates unique constraint \"stock_items_tenant_name_key\" ({})",
                            row.name
                        )));
                    }
                }
                let existing = self.working.stock_items.iter().map(|r| r.id);
                Self::check_new_ids(kind, existing, rows.iter().map(|r| &r.id))?;
                self.working.stock_items.extend_from_slice(rows);
            }
            InsertBatch::Purchase { purchase, items } => {
                self.check_tenant(kind, purchase.tenant_id)?;
                let supplier_exists =
                    self.working.suppliers.iter().any(|s| s.id == purchase.supplier_id);
                Self::check_parent(kind, supplier_exists, purchase.supplier_id)?;
                let existing = self.working.purchases.iter().map(|r| r.id);
                Self::check_new_ids(kind, existing, std::iter::once(&purchase.id))?;

                let item_kind = EntityKind::PurchaseItem;
                for item in items {
                    self.check_tenant(item_kind, item.tenant_id)?;
                    Self::check_parent(item_kind, item.purchase_id == purchase.id, item.purchase_id)?;
                    let stock_exists =
                        self.working.stock_items.iter().any(|s| s.id == item.stock_item_id);
                    Self::check_parent(item_kind, stock_exists, item.stock_item_id)?;
                }
                let existing = self.working.purchase_items.iter().map(|r| r.id);
                Self::check_new_ids(item_kind, existing, items.iter().map(|r| &r.id))?;

                self.working.purchases.push(purchase.clone());
                self.working.purchase_items.extend_from_slice(items);
            }
            InsertBatch::Employees(rows) => {
                for row in rows {
                    self.check_tenant(kind, row.tenant_id)?;
                }
                let existing = self.working.employees.iter().map(|r| r.id);
                Self::check_new_ids(kind, existing, rows.iter().map(|r| &r.id))?;
                self.working.employees.extend_from_slice(rows);
            }
            InsertBatch::Payments(rows) => {
                for row in rows {
                    self.check_tenant(kind, row.tenant_id)?;
                    let exists = self.working.employees.iter().any(|e| e.id == row.employee_id);
                    Self::check_parent(kind, exists, row.employee_id)?;
                }
                let existing = self.working.payments.iter().map(|r| r.id);
                Self::check_new_ids(kind, existing, rows.iter().map(|r| &r.id))?;
                self.working.payments.extend_from_slice(rows);
            }
            InsertBatch::ExpenseCategories(rows) => {
                for row in rows {
                    self.check_tenant(kind, row.tenant_id)?;
                }
                let existing = self.working.expense_categories.iter().map(|r| r.id);
                Self::check_new_ids(kind, existing, rows.iter().map(|r| &r.id))?;
                self.working.expense_categories.extend_from_slice(rows);
            }
            InsertBatch::Expenses(rows) => {
                for row in rows {
                    self.check_tenant(kind, row.tenant_id)?;
                    let exists =
                        self.working.expense_categories.iter().any(|c| c.id == row.category_id);
                    Self::check_parent(kind, exists, row.category_id)?;
                }
                let existing = self.working.expenses.iter().map(|r| r.id);
                Self::check_new_ids(kind, existing, rows.iter().map(|r| &r.id))?;
                self.working.expenses.extend_from_slice(rows);
            }
            InsertBatch::Sales(rows) => {
                for row in rows {
                    self.check_tenant(kind, row.tenant_id)?;
                }
                let existing = self.working.sales.iter().map(|r| r.id);
                Self::check_new_ids(kind, existing, rows.iter().map(|r| &r.id))?;
                self.working.sales.extend_from_slice(rows);
            }
            InsertBatch::Store(store) => {
                self.check_tenant(kind, store.tenant_id)?;
                if self.working.store.is_some() {
                    return Err(violation("duplicate key value violates unique constraint \"stores_tenant_key\""));
                }
                self.working.store = Some(store.clone());
            }
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let MemoryRestoreTx {
            mut guard,
            tenant_id,
            working,
            ..
        } = *self;
        guard.insert(tenant_id, working);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        Ok(())
    }
}

/// Dados de exemplo com ids fixos: dois tenants semeados com a mesma
/// fixture colidem em todos os ids.
pub(crate) mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::models::{
        backup::BackupData,
        expense::{Expense, ExpenseCategory},
        purchase::{Purchase, PurchaseItem, PurchaseWithItems},
        sale::Sale,
        staff::{Employee, Payment},
        stock::StockItem,
        store::Store,
        supplier::Supplier,
    };

    pub const SUPPLIER_A: Uuid = Uuid::from_u128(0x100);
    pub const SUPPLIER_B: Uuid = Uuid::from_u128(0x101);
    pub const FLOUR: Uuid = Uuid::from_u128(0x200);
    pub const SUGAR: Uuid = Uuid::from_u128(0x201);
    pub const PURCHASE_1: Uuid = Uuid::from_u128(0x300);
    pub const PURCHASE_2: Uuid = Uuid::from_u128(0x301);
    pub const COOK: Uuid = Uuid::from_u128(0x400);
    pub const WAITER: Uuid = Uuid::from_u128(0x401);
    pub const RENT: Uuid = Uuid::from_u128(0x500);
    pub const UTILITIES: Uuid = Uuid::from_u128(0x501);
    pub const STORE: Uuid = Uuid::from_u128(0x900);

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn item(id: u128, purchase_id: Uuid, stock_item_id: Uuid, tenant_id: Uuid) -> PurchaseItem {
        PurchaseItem {
            id: Uuid::from_u128(id),
            tenant_id,
            purchase_id,
            stock_item_id,
            quantity: dec!(2),
            unit_price: dec!(10.99),
            total: dec!(21.98),
            created_at: at(2, 9),
        }
    }

    /// Um tenant com um pouco de tudo. A farinha tem `totalValue` gravado
    /// diferente de `quantity × unitCost`, como um registro histórico.
    pub fn tenant_data(tenant_id: Uuid) -> BackupData {
        let supplier = |id, name: &str| Supplier {
            id,
            tenant_id,
            name: name.into(),
            phone: Some("11 99999-0000".into()),
            email: None,
            address: None,
            created_at: at(1, 8),
            updated_at: at(1, 8),
        };
        let purchase = |id, supplier_id, total| Purchase {
            id,
            tenant_id,
            supplier_id,
            date: at(2, 9),
            payment_method: "PIX".into(),
            notes: None,
            total,
            created_at: at(2, 9),
            updated_at: at(2, 9),
        };
        let expense = |id: u128, value| Expense {
            id: Uuid::from_u128(id),
            tenant_id,
            category_id: RENT,
            description: Some("Aluguel".into()),
            value,
            date: at(5, 12),
            payment_method: "BOLETO".into(),
            created_at: at(5, 12),
            updated_at: at(5, 12),
        };
        let sale = |id: u128, total_value| Sale {
            id: Uuid::from_u128(id),
            tenant_id,
            date: at(6, 20),
            total_value,
            payment_method: "CARTAO".into(),
            notes: None,
            created_at: at(6, 20),
            updated_at: at(6, 20),
        };

        BackupData {
            suppliers: vec![
                supplier(SUPPLIER_A, "Hortifruti Central"),
                supplier(SUPPLIER_B, "Moinho Sul"),
            ],
            purchases: vec![
                PurchaseWithItems {
                    purchase: purchase(PURCHASE_1, SUPPLIER_A, dec!(43.96)),
                    items: vec![
                        item(0x310, PURCHASE_1, FLOUR, tenant_id),
                        item(0x311, PURCHASE_1, SUGAR, tenant_id),
                    ],
                },
                PurchaseWithItems {
                    purchase: purchase(PURCHASE_2, SUPPLIER_B, dec!(21.98)),
                    items: vec![item(0x312, PURCHASE_2, FLOUR, tenant_id)],
                },
            ],
            stock_items: vec![
                StockItem {
                    id: FLOUR,
                    tenant_id,
                    name: "Farinha de trigo".into(),
                    description: None,
                    unit: "kg".into(),
                    quantity: dec!(3),
                    unit_cost: dec!(10.99),
                    // Recalcular daria 32.97.
                    total_value: dec!(33.00),
                    created_at: at(1, 9),
                    updated_at: at(3, 9),
                },
                StockItem {
                    id: SUGAR,
                    tenant_id,
                    name: "Açúcar".into(),
                    description: Some("Refinado".into()),
                    unit: "kg".into(),
                    quantity: dec!(0.5),
                    unit_cost: dec!(4.50),
                    total_value: dec!(2.250),
                    created_at: at(1, 9),
                    updated_at: at(1, 9),
                },
            ],
            employees: vec![
                Employee {
                    id: COOK,
                    tenant_id,
                    name: "Ana".into(),
                    tax_id: Some("123.456.789-00".into()),
                    phone: None,
                    role: "Cozinheira".into(),
                    base_salary: dec!(2500.00),
                    created_at: at(1, 10),
                    updated_at: at(1, 10),
                },
                Employee {
                    id: WAITER,
                    tenant_id,
                    name: "Bruno".into(),
                    tax_id: None,
                    phone: Some("11 98888-0000".into()),
                    role: "Garçom".into(),
                    base_salary: dec!(1800.00),
                    created_at: at(1, 10),
                    updated_at: at(1, 10),
                },
            ],
            payments: vec![
                Payment {
                    id: Uuid::from_u128(0x410),
                    tenant_id,
                    employee_id: COOK,
                    date: at(5, 18),
                    description: Some("Salário de abril".into()),
                    gross_value: dec!(2500.00),
                    discounts: dec!(275.50),
                    net_value: dec!(2224.50),
                    created_at: at(5, 18),
                    updated_at: at(5, 18),
                },
                Payment {
                    id: Uuid::from_u128(0x411),
                    tenant_id,
                    employee_id: WAITER,
                    date: at(5, 18),
                    description: None,
                    gross_value: dec!(1800.00),
                    discounts: dec!(0),
                    net_value: dec!(1800.00),
                    created_at: at(5, 18),
                    updated_at: at(5, 18),
                },
            ],
            expense_categories: vec![
                ExpenseCategory {
                    id: RENT,
                    tenant_id,
                    name: "Aluguel".into(),
                    created_at: at(1, 11),
                    updated_at: at(1, 11),
                },
                ExpenseCategory {
                    id: UTILITIES,
                    tenant_id,
                    name: "Contas".into(),
                    created_at: at(1, 11),
                    updated_at: at(1, 11),
                },
            ],
            expenses: vec![
                expense(0x510, dec!(1200.00)),
                expense(0x511, dec!(150.75)),
                expense(0x512, dec!(0.10)),
            ],
            sales: vec![sale(0x600, dec!(350.00)), sale(0x601, dec!(89.90))],
            store: Some(Store {
                id: STORE,
                tenant_id,
                name: "Cantina da Vila".into(),
                tax_id: Some("12.345.678/0001-99".into()),
                phone: None,
                address: Some("Rua das Flores, 10".into()),
                created_at: at(1, 7),
                updated_at: at(1, 7),
            }),
        }
    }

    /// Mesmos registros, carimbados com outro tenant.
    pub fn with_tenant(data: BackupData, tenant_id: Uuid) -> BackupData {
        crate::backup::coordinator::stamp_for_tenant(data, tenant_id)
    }
}
