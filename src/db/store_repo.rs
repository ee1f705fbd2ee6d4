// src/db/store_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::store::{Store, StorePayload},
};

#[derive(Clone, Copy, Default)]
pub struct StoreRepository;

impl StoreRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Option<Store>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let store = sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_optional(executor)
            .await?;

        Ok(store)
    }

    /// Cria ou atualiza o único perfil de loja do tenant.
    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &StorePayload,
    ) -> Result<Store, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let store = sqlx::query_as::<_, Store>(
            r#"
            INSERT INTO stores (id, tenant_id, name, tax_id, phone, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT ON CONSTRAINT stores_tenant_key DO UPDATE
            SET name = EXCLUDED.name,
                tax_id = EXCLUDED.tax_id,
                phone = EXCLUDED.phone,
                address = EXCLUDED.address,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(&payload.name)
        .bind(&payload.tax_id)
        .bind(&payload.phone)
        .bind(&payload.address)
        .fetch_one(executor)
        .await?;

        Ok(store)
    }
}
