// src/db/stock_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::stock::{StockItem, StockItemPayload},
};

#[derive(Clone, Copy, Default)]
pub struct StockRepository;

impl StockRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<StockItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, StockItem>(
            "SELECT * FROM stock_items WHERE tenant_id = $1 ORDER BY name ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }

    // Os erros de sqlx voltam crus: o serviço traduz a violação de unicidade do nome.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &StockItemPayload,
        total_value: Decimal,
    ) -> Result<StockItem, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, StockItem>(
            r#"
            INSERT INTO stock_items (id, tenant_id, name, description, unit, quantity, unit_cost, total_value)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(&payload.unit)
        .bind(payload.quantity)
        .bind(payload.unit_cost)
        .bind(total_value)
        .fetch_one(executor)
        .await
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &StockItemPayload,
        total_value: Decimal,
    ) -> Result<Option<StockItem>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, StockItem>(
            r#"
            UPDATE stock_items
            SET name = $3, description = $4, unit = $5, quantity = $6,
                unit_cost = $7, total_value = $8, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(&payload.unit)
        .bind(payload.quantity)
        .bind(payload.unit_cost)
        .bind(total_value)
        .fetch_optional(executor)
        .await
    }

    pub async fn delete<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM stock_items WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
