// src/backup/summary.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    backup::{catalog::EntityKind, store::BackupStore},
    cache::{CacheScope, CacheTag, TaggedCache},
    common::error::AppError,
    models::backup::BackupSummary,
};

/// Contagens por entidade para a tela de backup, em cache por tenant.
#[derive(Clone)]
pub struct SummaryAggregator {
    store: Arc<dyn BackupStore>,
    cache: TaggedCache,
}

impl SummaryAggregator {
    pub fn new(store: Arc<dyn BackupStore>, cache: TaggedCache) -> Self {
        Self { store, cache }
    }

    pub async fn get_summary(&self, tenant_id: Uuid) -> Result<BackupSummary, AppError> {
        let tag = CacheTag::new(CacheScope::BackupSummary, tenant_id);
        self.cache
            .get_or_load(tag, || count_all(self.store.as_ref(), tenant_id))
            .await
    }
}

async fn count_all(store: &dyn BackupStore, tenant_id: Uuid) -> Result<BackupSummary, AppError> {
    let (suppliers, purchases, stock_items, employees, payments, expenses, sales) = tokio::try_join!(
        store.count(tenant_id, EntityKind::Supplier),
        store.count(tenant_id, EntityKind::Purchase),
        store.count(tenant_id, EntityKind::StockItem),
        store.count(tenant_id, EntityKind::Employee),
        store.count(tenant_id, EntityKind::Payment),
        store.count(tenant_id, EntityKind::Expense),
        store.count(tenant_id, EntityKind::Sale),
    )?;

    Ok(BackupSummary {
        suppliers,
        purchases,
        stock_items,
        employees,
        payments,
        expenses,
        sales,
    })
}
