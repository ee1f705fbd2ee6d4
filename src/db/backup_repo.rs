// src/db/backup_repo.rs
//
// Implementação Postgres da fronteira de armazenamento do backup.

use async_trait::async_trait;
use sqlx::{query_builder::Separated, PgConnection, PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::{
    backup::{
        catalog::EntityKind,
        store::{BackupStore, InsertBatch, RestoreTransaction},
    },
    common::{
        db_utils::{begin_tenant_tx, lock_tenant},
        error::AppError,
    },
    db::{
        ExpenseRepository, PurchaseRepository, SaleRepository, StaffRepository, StockRepository,
        StoreRepository, SupplierRepository,
    },
    models::{
        expense::{Expense, ExpenseCategory},
        purchase::PurchaseWithItems,
        sale::Sale,
        staff::{Employee, Payment},
        stock::StockItem,
        store::Store,
        supplier::Supplier,
    },
};

// Linhas por INSERT: abaixo do limite de 65535 parâmetros do Postgres.
const INSERT_CHUNK: usize = 1000;

#[derive(Clone)]
pub struct PgBackupStore {
    pool: PgPool,
    supplier_repo: SupplierRepository,
    stock_repo: StockRepository,
    purchase_repo: PurchaseRepository,
    staff_repo: StaffRepository,
    expense_repo: ExpenseRepository,
    sale_repo: SaleRepository,
    store_repo: StoreRepository,
}

impl PgBackupStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            supplier_repo: SupplierRepository::new(),
            stock_repo: StockRepository::new(),
            purchase_repo: PurchaseRepository::new(),
            staff_repo: StaffRepository::new(),
            expense_repo: ExpenseRepository::new(),
            sale_repo: SaleRepository::new(),
            store_repo: StoreRepository::new(),
        }
    }
}

// Cada leitura abre a sua própria transação com o tenant definido: na
// exportação elas rodam em paralelo, em conexões diferentes do pool.
#[async_trait]
impl BackupStore for PgBackupStore {
    async fn suppliers(&self, tenant_id: Uuid) -> Result<Vec<Supplier>, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let rows = self.supplier_repo.list(&mut *tx, tenant_id).await?;
        tx.commit().await?;
        Ok(rows)
    }

    async fn purchases(&self, tenant_id: Uuid) -> Result<Vec<PurchaseWithItems>, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let rows = self.purchase_repo.list_with_items(&mut tx, tenant_id).await?;
        tx.commit().await?;
        Ok(rows)
    }

    async fn stock_items(&self, tenant_id: Uuid) -> Result<Vec<StockItem>, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let rows = self.stock_repo.list(&mut *tx, tenant_id).await?;
        tx.commit().await?;
        Ok(rows)
    }

    async fn employees(&self, tenant_id: Uuid) -> Result<Vec<Employee>, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let rows = self.staff_repo.list_employees(&mut *tx, tenant_id).await?;
        tx.commit().await?;
        Ok(rows)
    }

    async fn payments(&self, tenant_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let rows = self.staff_repo.list_payments(&mut *tx, tenant_id).await?;
        tx.commit().await?;
        Ok(rows)
    }

    async fn expense_categories(&self, tenant_id: Uuid) -> Result<Vec<ExpenseCategory>, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let rows = self.expense_repo.list_categories(&mut *tx, tenant_id).await?;
        tx.commit().await?;
        Ok(rows)
    }

    async fn expenses(&self, tenant_id: Uuid) -> Result<Vec<Expense>, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let rows = self.expense_repo.list_expenses(&mut *tx, tenant_id).await?;
        tx.commit().await?;
        Ok(rows)
    }

    async fn sales(&self, tenant_id: Uuid) -> Result<Vec<Sale>, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let rows = self.sale_repo.list(&mut *tx, tenant_id).await?;
        tx.commit().await?;
        Ok(rows)
    }

    async fn store(&self, tenant_id: Uuid) -> Result<Option<Store>, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let row = self.store_repo.find(&mut *tx, tenant_id).await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn count(&self, tenant_id: Uuid, kind: EntityKind) -> Result<i64, AppError> {
        // O nome da tabela vem do catálogo, nunca da requisição.
        let sql = format!("SELECT COUNT(*) FROM {} WHERE tenant_id = $1", kind.table());
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(tenant_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(count)
    }

    async fn begin_restore(&self, tenant_id: Uuid) -> Result<Box<dyn RestoreTransaction>, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        lock_tenant(&mut tx, tenant_id).await?;
        tracing::debug!(%tenant_id, "lock de restauração adquirido");

        Ok(Box::new(PgRestoreTransaction {
            tx,
            tenant_id,
            purchase_repo: self.purchase_repo,
        }))
    }
}

pub struct PgRestoreTransaction {
    tx: Transaction<'static, Postgres>,
    tenant_id: Uuid,
    purchase_repo: PurchaseRepository,
}

#[async_trait]
impl RestoreTransaction for PgRestoreTransaction {
    async fn delete_all(&mut self, kind: EntityKind) -> Result<u64, AppError> {
        let sql = format!("DELETE FROM {} WHERE tenant_id = $1", kind.table());
        let result = sqlx::query(&sql)
            .bind(self.tenant_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert(&mut self, batch: InsertBatch<'_>) -> Result<(), AppError> {
        let conn: &mut PgConnection = &mut self.tx;
        match batch {
            InsertBatch::Suppliers(rows) => {
                bulk_insert(
                    conn,
                    "INSERT INTO suppliers (id, tenant_id, name, phone, email, address, created_at, updated_at) ",
                    rows,
                    |mut b, r| {
                        b.push_bind(r.id)
                            .push_bind(r.tenant_id)
                            .push_bind(r.name.clone())
                            .push_bind(r.phone.clone())
                            .push_bind(r.email.clone())
                            .push_bind(r.address.clone())
                            .push_bind(r.created_at)
                            .push_bind(r.updated_at);
                    },
                )
                .await?
            }
            InsertBatch::StockItems(rows) => {
                bulk_insert(
                    conn,
                    "INSERT INTO stock_items (id, tenant_id, name, description, unit, quantity, unit_cost, total_value, created_at, updated_at) ",
                    rows,
                    |mut b, r| {
                        b.push_bind(r.id)
                            .push_bind(r.tenant_id)
                            .push_bind(r.name.clone())
                            .push_bind(r.description.clone())
                            .push_bind(r.unit.clone())
                            .push_bind(r.quantity)
                            .push_bind(r.unit_cost)
                            .push_bind(r.total_value)
                            .push_bind(r.created_at)
                            .push_bind(r.updated_at);
                    },
                )
                .await?
            }
            InsertBatch::Purchase { purchase, items } => {
                self.purchase_repo.insert_purchase(conn, purchase).await?;
                self.purchase_repo.insert_items(conn, items).await?;
            }
            InsertBatch::Employees(rows) => {
                bulk_insert(
                    conn,
                    "INSERT INTO employees (id, tenant_id, name, tax_id, phone, role, base_salary, created_at, updated_at) ",
                    rows,
                    |mut b, r| {
                        b.push_bind(r.id)
                            .push_bind(r.tenant_id)
                            .push_bind(r.name.clone())
                            .push_bind(r.tax_id.clone())
                            .push_bind(r.phone.clone())
                            .push_bind(r.role.clone())
                            .push_bind(r.base_salary)
                            .push_bind(r.created_at)
                            .push_bind(r.updated_at);
                    },
                )
                .await?
            }
            InsertBatch::Payments(rows) => {
                bulk_insert(
                    conn,
                    "INSERT INTO payments (id, tenant_id, employee_id, date, description, gross_value, discounts, net_value, created_at, updated_at) ",
                    rows,
                    |mut b, r| {
                        b.push_bind(r.id)
                            .push_bind(r.tenant_id)
                            .push_bind(r.employee_id)
                            .push_bind(r.date)
                            .push_bind(r.description.clone())
                            .push_bind(r.gross_value)
                            .push_bind(r.discounts)
                            .push_bind(r.net_value)
                            .push_bind(r.created_at)
                            .push_bind(r.updated_at);
                    },
                )
                .await?
            }
            InsertBatch::ExpenseCategories(rows) => {
                bulk_insert(
                    conn,
                    "INSERT INTO expense_categories (id, tenant_id, name, created_at, updated_at) ",
                    rows,
                    |mut b, r| {
                        b.push_bind(r.id)
                            .push_bind(r.tenant_id)
                            .push_bind(r.name.clone())
                            .push_bind(r.created_at)
                            .push_bind(r.updated_at);
                    },
                )
                .await?
            }
            InsertBatch::Expenses(rows) => {
                bulk_insert(
                    conn,
                    "INSERT INTO expenses (id, tenant_id, category_id, description, value, date, payment_method, created_at, updated_at) ",
                    rows,
                    |mut b, r| {
                        b.push_bind(r.id)
                            .push_bind(r.tenant_id)
                            .push_bind(r.category_id)
                            .push_bind(r.description.clone())
                            .push_bind(r.value)
                            .push_bind(r.date)
                            .push_bind(r.payment_method.clone())
                            .push_bind(r.created_at)
                            .push_bind(r.updated_at);
                    },
                )
                .await?
            }
            InsertBatch::Sales(rows) => {
                bulk_insert(
                    conn,
                    "INSERT INTO sales (id, tenant_id, date, total_value, payment_method, notes, created_at, updated_at) ",
                    rows,
                    |mut b, r| {
                        b.push_bind(r.id)
                            .push_bind(r.tenant_id)
                            .push_bind(r.date)
                            .push_bind(r.total_value)
                            .push_bind(r.payment_method.clone())
                            .push_bind(r.notes.clone())
                            .push_bind(r.created_at)
                            .push_bind(r.updated_at);
                    },
                )
                .await?
            }
            InsertBatch::Store(store) => {
                // A loja foi apagada antes: aqui é sempre criação, nunca upsert.
                sqlx::query(
                    r#"
                    INSERT INTO stores (id, tenant_id, name, tax_id, phone, address, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    "#,
                )
                .bind(store.id)
                .bind(store.tenant_id)
                .bind(&store.name)
                .bind(&store.tax_id)
                .bind(&store.phone)
                .bind(&store.address)
                .bind(store.created_at)
                .bind(store.updated_at)
                .execute(conn)
                .await?;
            }
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

/// INSERT multi-linha em blocos de [`INSERT_CHUNK`].
async fn bulk_insert<T, F>(
    conn: &mut PgConnection,
    head: &'static str,
    rows: &[T],
    mut bind_row: F,
) -> Result<(), sqlx::Error>
where
    T: Sync,
    F: FnMut(Separated<'_, 'static, Postgres, &'static str>, &T) + Send,
{
    for chunk in rows.chunks(INSERT_CHUNK) {
        let mut builder: QueryBuilder<'static, Postgres> = QueryBuilder::new(head);
        builder.push_values(chunk, &mut bind_row);
        builder.build().execute(&mut *conn).await?;
    }
    Ok(())
}
