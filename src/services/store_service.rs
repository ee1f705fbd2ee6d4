// src/services/store_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    cache::{CacheScope, CacheTag, InvalidationBus, TaggedCache},
    common::{db_utils::begin_tenant_tx, error::AppError},
    db::StoreRepository,
    models::store::{Store, StorePayload},
};

#[derive(Clone)]
pub struct StoreService {
    pool: PgPool,
    store_repo: StoreRepository,
    cache: TaggedCache,
}

impl StoreService {
    pub fn new(pool: PgPool, store_repo: StoreRepository, cache: TaggedCache) -> Self {
        Self { pool, store_repo, cache }
    }

    /// `None` enquanto o tenant não cadastrou a loja.
    pub async fn get(&self, tenant_id: Uuid) -> Result<Option<Store>, AppError> {
        let tag = CacheTag::new(CacheScope::Store, tenant_id);
        self.cache
            .get_or_load(tag, || async {
                let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
                let store = self.store_repo.find(&mut *tx, tenant_id).await?;
                tx.commit().await?;
                Ok(store)
            })
            .await
    }

    pub async fn save(&self, tenant_id: Uuid, payload: StorePayload) -> Result<Store, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let store = self.store_repo.upsert(&mut *tx, tenant_id, &payload).await?;
        tx.commit().await?;

        self.cache.invalidate_all(tenant_id, &[CacheScope::Store]);
        Ok(store)
    }
}
