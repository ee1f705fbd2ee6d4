// src/services/stock_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    cache::{CacheScope, CacheTag, InvalidationBus, TaggedCache},
    common::{db_utils::begin_tenant_tx, error::AppError},
    db::StockRepository,
    models::stock::{StockItem, StockItemPayload},
};

// Toda mutação de estoque mexe na lista, no alerta de estoque baixo e no resumo.
const STOCK_SCOPES: [CacheScope; 3] = [
    CacheScope::StockItems,
    CacheScope::LowStock,
    CacheScope::BackupSummary,
];

#[derive(Clone)]
pub struct StockService {
    pool: PgPool,
    stock_repo: StockRepository,
    cache: TaggedCache,
}

impl StockService {
    pub fn new(pool: PgPool, stock_repo: StockRepository, cache: TaggedCache) -> Self {
        Self { pool, stock_repo, cache }
    }

    pub async fn list(&self, tenant_id: Uuid) -> Result<Vec<StockItem>, AppError> {
        let tag = CacheTag::new(CacheScope::StockItems, tenant_id);
        self.cache
            .get_or_load(tag, || async {
                let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
                let items = self.stock_repo.list(&mut *tx, tenant_id).await?;
                tx.commit().await?;
                Ok(items)
            })
            .await
    }

    pub async fn create(&self, tenant_id: Uuid, payload: StockItemPayload) -> Result<StockItem, AppError> {
        let total_value = StockItem::compute_total_value(payload.quantity, payload.unit_cost);

        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let item = self
            .stock_repo
            .create(&mut *tx, tenant_id, &payload, total_value)
            .await
            .map_err(|e| map_name_conflict(e, &payload.name))?;
        tx.commit().await?;

        self.cache.invalidate_all(tenant_id, &STOCK_SCOPES);
        Ok(item)
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        payload: StockItemPayload,
    ) -> Result<StockItem, AppError> {
        let total_value = StockItem::compute_total_value(payload.quantity, payload.unit_cost);

        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let item = self
            .stock_repo
            .update(&mut *tx, tenant_id, id, &payload, total_value)
            .await
            .map_err(|e| map_name_conflict(e, &payload.name))?
            .ok_or(AppError::NotFound("Item de estoque"))?;
        tx.commit().await?;

        self.cache.invalidate_all(tenant_id, &STOCK_SCOPES);
        Ok(item)
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let deleted = self
            .stock_repo
            .delete(&mut *tx, tenant_id, id)
            .await
            .map_err(|e| {
                AppError::from_delete(
                    e,
                    "Não é possível excluir este item pois ele aparece em compras registradas",
                )
            })?;
        if deleted == 0 {
            return Err(AppError::NotFound("Item de estoque"));
        }
        tx.commit().await?;

        self.cache.invalidate_all(tenant_id, &STOCK_SCOPES);
        Ok(())
    }
}

/// O nome do item é único por tenant (constraint `stock_items_tenant_name_key`).
fn map_name_conflict(err: sqlx::Error, name: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::StockItemNameAlreadyExists(name.to_string());
        }
    }
    err.into()
}
