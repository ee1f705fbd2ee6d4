// src/db/supplier_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::supplier::{Supplier, SupplierPayload},
};

#[derive(Clone, Copy, Default)]
pub struct SupplierRepository;

impl SupplierRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT * FROM suppliers WHERE tenant_id = $1 ORDER BY name ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(suppliers)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &SupplierPayload,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (id, tenant_id, name, phone, email, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(&payload.name)
        .bind(&payload.phone)
        .bind(&payload.email)
        .bind(&payload.address)
        .fetch_one(executor)
        .await?;

        Ok(supplier)
    }

    /// Devolve quantas linhas foram apagadas (0 = não existe neste tenant).
    /// Fornecedor com compras dispara violação de FK (23503).
    pub async fn delete<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM suppliers WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
