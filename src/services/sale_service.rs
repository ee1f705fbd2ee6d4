// src/services/sale_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    cache::{CacheScope, CacheTag, InvalidationBus, TaggedCache},
    common::{db_utils::begin_tenant_tx, error::AppError},
    db::SaleRepository,
    models::sale::{Sale, SalePayload},
};

const SALE_SCOPES: [CacheScope; 4] = [
    CacheScope::Sales,
    CacheScope::DashboardMetrics,
    CacheScope::ChartData,
    CacheScope::BackupSummary,
];

#[derive(Clone)]
pub struct SaleService {
    pool: PgPool,
    sale_repo: SaleRepository,
    cache: TaggedCache,
}

impl SaleService {
    pub fn new(pool: PgPool, sale_repo: SaleRepository, cache: TaggedCache) -> Self {
        Self { pool, sale_repo, cache }
    }

    pub async fn list(&self, tenant_id: Uuid) -> Result<Vec<Sale>, AppError> {
        let tag = CacheTag::new(CacheScope::Sales, tenant_id);
        self.cache
            .get_or_load(tag, || async {
                let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
                let sales = self.sale_repo.list(&mut *tx, tenant_id).await?;
                tx.commit().await?;
                Ok(sales)
            })
            .await
    }

    pub async fn create(&self, tenant_id: Uuid, payload: SalePayload) -> Result<Sale, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let sale = self.sale_repo.create(&mut *tx, tenant_id, &payload).await?;
        tx.commit().await?;

        self.cache.invalidate_all(tenant_id, &SALE_SCOPES);
        Ok(sale)
    }

    pub async fn update(&self, tenant_id: Uuid, id: Uuid, payload: SalePayload) -> Result<Sale, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let sale = self
            .sale_repo
            .update(&mut *tx, tenant_id, id, &payload)
            .await?
            .ok_or(AppError::NotFound("Venda"))?;
        tx.commit().await?;

        self.cache.invalidate_all(tenant_id, &SALE_SCOPES);
        Ok(sale)
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        if self.sale_repo.delete(&mut *tx, tenant_id, id).await? == 0 {
            return Err(AppError::NotFound("Venda"));
        }
        tx.commit().await?;

        self.cache.invalidate_all(tenant_id, &SALE_SCOPES);
        Ok(())
    }
}
