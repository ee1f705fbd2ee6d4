// src/db/sale_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sale::{Sale, SalePayload},
};

#[derive(Clone, Copy, Default)]
pub struct SaleRepository;

impl SaleRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sales = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales WHERE tenant_id = $1 ORDER BY date DESC, created_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(sales)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &SalePayload,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO sales (id, tenant_id, date, total_value, payment_method, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(payload.date)
        .bind(payload.total_value)
        .bind(&payload.payment_method)
        .bind(&payload.notes)
        .fetch_one(executor)
        .await?;

        Ok(sale)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &SalePayload,
    ) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            UPDATE sales
            SET date = $3, total_value = $4, payment_method = $5, notes = $6, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(payload.date)
        .bind(payload.total_value)
        .bind(&payload.payment_method)
        .bind(&payload.notes)
        .fetch_optional(executor)
        .await?;

        Ok(sale)
    }

    pub async fn delete<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sales WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
