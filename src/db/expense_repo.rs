// src/db/expense_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::expense::{Expense, ExpenseCategory, ExpenseCategoryPayload, ExpensePayload},
    services::expense_service::CategoryDeletion,
};

#[derive(Clone, Copy, Default)]
pub struct ExpenseRepository;

impl ExpenseRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn list_categories<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<ExpenseCategory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let categories = sqlx::query_as::<_, ExpenseCategory>(
            "SELECT * FROM expense_categories WHERE tenant_id = $1 ORDER BY name ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(categories)
    }

    pub async fn create_category<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &ExpenseCategoryPayload,
    ) -> Result<ExpenseCategory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, ExpenseCategory>(
            r#"
            INSERT INTO expense_categories (id, tenant_id, name)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(&payload.name)
        .fetch_one(executor)
        .await?;

        Ok(category)
    }

    pub async fn category_exists<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM expense_categories WHERE tenant_id = $1 AND id = $2)",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    pub async fn count_expenses_in_category<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        category_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM expenses WHERE tenant_id = $1 AND category_id = $2",
        )
        .bind(tenant_id)
        .bind(category_id)
        .fetch_one(executor)
        .await?;

        Ok(count)
    }

    pub async fn delete_category<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM expense_categories WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  DESPESAS
    // =========================================================================

    pub async fn list_expenses<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expenses = sqlx::query_as::<_, Expense>(
            "SELECT * FROM expenses WHERE tenant_id = $1 ORDER BY date DESC, created_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(expenses)
    }

    pub async fn create_expense<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &ExpensePayload,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (id, tenant_id, category_id, description, value, date, payment_method)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(payload.category_id)
        .bind(&payload.description)
        .bind(payload.value)
        .bind(payload.date)
        .bind(&payload.payment_method)
        .fetch_one(executor)
        .await?;

        Ok(expense)
    }

    pub async fn update_expense<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &ExpensePayload,
    ) -> Result<Option<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses
            SET category_id = $3, description = $4, value = $5, date = $6,
                payment_method = $7, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(payload.category_id)
        .bind(&payload.description)
        .bind(payload.value)
        .bind(payload.date)
        .bind(&payload.payment_method)
        .fetch_optional(executor)
        .await?;

        Ok(expense)
    }

    pub async fn delete_expense<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM expenses WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Exclusão de categoria sobre a transação do tenant.
pub struct PgCategoryDeletion<'c> {
    conn: &'c mut PgConnection,
    repo: ExpenseRepository,
}

impl<'c> PgCategoryDeletion<'c> {
    pub fn new(conn: &'c mut PgConnection, repo: ExpenseRepository) -> Self {
        Self { conn, repo }
    }
}

#[async_trait]
impl CategoryDeletion for PgCategoryDeletion<'_> {
    async fn category_exists(&mut self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        self.repo.category_exists(&mut *self.conn, tenant_id, id).await
    }

    async fn count_expenses(&mut self, tenant_id: Uuid, category_id: Uuid) -> Result<i64, AppError> {
        self.repo
            .count_expenses_in_category(&mut *self.conn, tenant_id, category_id)
            .await
    }

    async fn delete_category(&mut self, tenant_id: Uuid, id: Uuid) -> Result<u64, AppError> {
        // Uma despesa criada entre a contagem e o delete ainda cai na FK.
        self.repo
            .delete_category(&mut *self.conn, tenant_id, id)
            .await
            .map_err(|e| {
                AppError::from_delete(
                    e,
                    "Não é possível excluir esta categoria pois existem despesas associadas",
                )
            })
    }
}
