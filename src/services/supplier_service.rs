// src/services/supplier_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    cache::{CacheScope, CacheTag, InvalidationBus, TaggedCache},
    common::{db_utils::begin_tenant_tx, error::AppError},
    db::SupplierRepository,
    models::supplier::{Supplier, SupplierPayload},
};

const SUPPLIER_IN_USE: &str =
    "Não é possível excluir este fornecedor pois existem compras associadas a ele";

#[derive(Clone)]
pub struct SupplierService {
    pool: PgPool,
    supplier_repo: SupplierRepository,
    cache: TaggedCache,
}

impl SupplierService {
    pub fn new(pool: PgPool, supplier_repo: SupplierRepository, cache: TaggedCache) -> Self {
        Self { pool, supplier_repo, cache }
    }

    pub async fn list(&self, tenant_id: Uuid) -> Result<Vec<Supplier>, AppError> {
        let tag = CacheTag::new(CacheScope::Suppliers, tenant_id);
        self.cache
            .get_or_load(tag, || async {
                let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
                let suppliers = self.supplier_repo.list(&mut *tx, tenant_id).await?;
                tx.commit().await?;
                Ok(suppliers)
            })
            .await
    }

    /// Espera o payload já normalizado e validado pelo handler.
    pub async fn create(&self, tenant_id: Uuid, payload: SupplierPayload) -> Result<Supplier, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let supplier = self.supplier_repo.create(&mut *tx, tenant_id, &payload).await?;
        tx.commit().await?;

        self.cache
            .invalidate_all(tenant_id, &[CacheScope::Suppliers, CacheScope::BackupSummary]);
        Ok(supplier)
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let deleted = self
            .supplier_repo
            .delete(&mut *tx, tenant_id, id)
            .await
            .map_err(|e| AppError::from_delete(e, SUPPLIER_IN_USE))?;
        if deleted == 0 {
            return Err(AppError::NotFound("Fornecedor"));
        }
        tx.commit().await?;

        self.cache
            .invalidate_all(tenant_id, &[CacheScope::Suppliers, CacheScope::BackupSummary]);
        Ok(())
    }
}
