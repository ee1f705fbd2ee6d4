// src/services/expense_service.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    cache::{CacheScope, CacheTag, InvalidationBus, TaggedCache},
    common::{db_utils::begin_tenant_tx, error::AppError},
    db::{expense_repo::PgCategoryDeletion, ExpenseRepository},
    models::expense::{Expense, ExpenseCategory, ExpenseCategoryPayload, ExpensePayload},
};

const EXPENSE_SCOPES: [CacheScope; 4] = [
    CacheScope::Expenses,
    CacheScope::DashboardMetrics,
    CacheScope::ChartData,
    CacheScope::BackupSummary,
];

/// Categoria só pode ser excluída sem despesas vinculadas.
pub fn ensure_category_unused(expense_count: i64) -> Result<(), AppError> {
    if expense_count > 0 {
        return Err(AppError::ReferentialConflict(format!(
            "Não é possível excluir esta categoria pois existem {expense_count} despesa(s) associada(s)"
        )));
    }
    Ok(())
}

/// Passos da exclusão de categoria, todos na mesma transação.
#[async_trait]
pub trait CategoryDeletion: Send {
    async fn category_exists(&mut self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError>;
    async fn count_expenses(&mut self, tenant_id: Uuid, category_id: Uuid) -> Result<i64, AppError>;
    async fn delete_category(&mut self, tenant_id: Uuid, id: Uuid) -> Result<u64, AppError>;
}

/// Confere existência e uso antes de excluir. Em conflito nada é apagado.
pub async fn remove_unused_category<S>(steps: &mut S, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
where
    S: CategoryDeletion + ?Sized,
{
    if !steps.category_exists(tenant_id, id).await? {
        return Err(AppError::NotFound("Categoria"));
    }
    ensure_category_unused(steps.count_expenses(tenant_id, id).await?)?;
    if steps.delete_category(tenant_id, id).await? == 0 {
        return Err(AppError::NotFound("Categoria"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ExpenseService {
    pool: PgPool,
    expense_repo: ExpenseRepository,
    cache: TaggedCache,
}

impl ExpenseService {
    pub fn new(pool: PgPool, expense_repo: ExpenseRepository, cache: TaggedCache) -> Self {
        Self { pool, expense_repo, cache }
    }

    // --- CATEGORIAS ---

    pub async fn list_categories(&self, tenant_id: Uuid) -> Result<Vec<ExpenseCategory>, AppError> {
        let tag = CacheTag::new(CacheScope::ExpenseCategories, tenant_id);
        self.cache
            .get_or_load(tag, || async {
                let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
                let categories = self.expense_repo.list_categories(&mut *tx, tenant_id).await?;
                tx.commit().await?;
                Ok(categories)
            })
            .await
    }

    pub async fn create_category(
        &self,
        tenant_id: Uuid,
        payload: ExpenseCategoryPayload,
    ) -> Result<ExpenseCategory, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let category = self.expense_repo.create_category(&mut *tx, tenant_id, &payload).await?;
        tx.commit().await?;

        self.cache.invalidate_all(tenant_id, &[CacheScope::ExpenseCategories]);
        Ok(category)
    }

    pub async fn delete_category(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let mut steps = PgCategoryDeletion::new(&mut *tx, self.expense_repo);
        remove_unused_category(&mut steps, tenant_id, id).await?;
        tx.commit().await?;

        self.cache.invalidate_all(tenant_id, &[CacheScope::ExpenseCategories]);
        Ok(())
    }

    // --- DESPESAS ---

    pub async fn list_expenses(&self, tenant_id: Uuid) -> Result<Vec<Expense>, AppError> {
        let tag = CacheTag::new(CacheScope::Expenses, tenant_id);
        self.cache
            .get_or_load(tag, || async {
                let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
                let expenses = self.expense_repo.list_expenses(&mut *tx, tenant_id).await?;
                tx.commit().await?;
                Ok(expenses)
            })
            .await
    }

    pub async fn create_expense(&self, tenant_id: Uuid, payload: ExpensePayload) -> Result<Expense, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        self.ensure_category(&mut tx, tenant_id, payload.category_id).await?;
        let expense = self.expense_repo.create_expense(&mut *tx, tenant_id, &payload).await?;
        tx.commit().await?;

        self.cache.invalidate_all(tenant_id, &EXPENSE_SCOPES);
        Ok(expense)
    }

    pub async fn update_expense(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        payload: ExpensePayload,
    ) -> Result<Expense, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        self.ensure_category(&mut tx, tenant_id, payload.category_id).await?;
        let expense = self
            .expense_repo
            .update_expense(&mut *tx, tenant_id, id, &payload)
            .await?
            .ok_or(AppError::NotFound("Despesa"))?;
        tx.commit().await?;

        self.cache.invalidate_all(tenant_id, &EXPENSE_SCOPES);
        Ok(expense)
    }

    pub async fn delete_expense(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        if self.expense_repo.delete_expense(&mut *tx, tenant_id, id).await? == 0 {
            return Err(AppError::NotFound("Despesa"));
        }
        tx.commit().await?;

        self.cache.invalidate_all(tenant_id, &EXPENSE_SCOPES);
        Ok(())
    }

    async fn ensure_category(
        &self,
        tx: &mut sqlx::Transaction<'static, sqlx::Postgres>,
        tenant_id: Uuid,
        category_id: Uuid,
    ) -> Result<(), AppError> {
        if !self.expense_repo.category_exists(&mut **tx, tenant_id, category_id).await? {
            return Err(AppError::NotFound("Categoria"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashSet;

    #[derive(Default)]
    struct MemoryCategories {
        categories: HashSet<(Uuid, Uuid)>,
        // (tenant, despesa, categoria)
        expenses: Vec<(Uuid, Uuid, Uuid)>,
        deletes: usize,
    }

    #[async_trait]
    impl CategoryDeletion for MemoryCategories {
        async fn category_exists(&mut self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
            Ok(self.categories.contains(&(tenant_id, id)))
        }

        async fn count_expenses(&mut self, tenant_id: Uuid, category_id: Uuid) -> Result<i64, AppError> {
            let count = self
                .expenses
                .iter()
                .filter(|(t, _, c)| *t == tenant_id && *c == category_id)
                .count();
            Ok(count as i64)
        }

        async fn delete_category(&mut self, tenant_id: Uuid, id: Uuid) -> Result<u64, AppError> {
            self.deletes += 1;
            Ok(u64::from(self.categories.remove(&(tenant_id, id))))
        }
    }

    fn with_category(tenant: Uuid, category: Uuid, expenses: usize) -> MemoryCategories {
        let mut store = MemoryCategories::default();
        store.categories.insert((tenant, category));
        store.expenses = (0..expenses).map(|_| (tenant, Uuid::new_v4(), category)).collect();
        store
    }

    #[tokio::test]
    async fn used_category_survives_a_delete_attempt_with_its_expenses() {
        let tenant = Uuid::new_v4();
        let category = Uuid::new_v4();
        let mut store = with_category(tenant, category, 3);
        let expenses_before = store.expenses.clone();

        let err = remove_unused_category(&mut store, tenant, category).await.unwrap_err();

        assert_matches!(err, AppError::ReferentialConflict(ref msg) if msg.contains('3'));
        assert_eq!(store.deletes, 0);
        assert!(store.categories.contains(&(tenant, category)));
        assert_eq!(store.expenses, expenses_before);
    }

    #[tokio::test]
    async fn unused_category_is_removed() {
        let tenant = Uuid::new_v4();
        let category = Uuid::new_v4();
        let mut store = with_category(tenant, category, 0);
        // Despesas de outro tenant não contam.
        store.expenses.push((Uuid::new_v4(), Uuid::new_v4(), category));

        remove_unused_category(&mut store, tenant, category).await.unwrap();

        assert!(store.categories.is_empty());
        assert_eq!(store.deletes, 1);
    }

    #[tokio::test]
    async fn missing_category_is_not_found() {
        let mut store = MemoryCategories::default();
        let err = remove_unused_category(&mut store, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_matches!(err, AppError::NotFound("Categoria"));
        assert_eq!(store.deletes, 0);
    }

    #[test]
    fn category_with_expenses_cannot_be_deleted() {
        let err = ensure_category_unused(3).unwrap_err();
        assert_matches!(err, AppError::ReferentialConflict(ref msg) if msg.contains("existem 3 despesa(s)"));
    }

    #[test]
    fn empty_category_can_be_deleted() {
        assert!(ensure_category_unused(0).is_ok());
    }
}
