// src/services/backup_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    backup::{
        coordinator::RestoreCoordinator,
        serializer::{backup_file_name, export_tenant, to_json},
        store::BackupStore,
        summary::SummaryAggregator,
        validator::validate,
    },
    cache::TaggedCache,
    common::error::AppError,
    models::backup::{BackupSummary, RestoreReport},
};

/// Arquivo pronto para download.
#[derive(Debug, Clone)]
pub struct BackupFile {
    pub file_name: String,
    pub content: String,
}

#[derive(Clone)]
pub struct BackupService {
    store: Arc<dyn BackupStore>,
    coordinator: RestoreCoordinator,
    summary: SummaryAggregator,
}

impl BackupService {
    pub fn new(store: Arc<dyn BackupStore>, cache: TaggedCache) -> Self {
        Self {
            coordinator: RestoreCoordinator::new(store.clone(), Arc::new(cache.clone())),
            summary: SummaryAggregator::new(store.clone(), cache),
            store,
        }
    }

    pub async fn export(&self, tenant_id: Uuid) -> Result<BackupFile, AppError> {
        let bundle = export_tenant(self.store.as_ref(), tenant_id).await?;
        Ok(BackupFile {
            file_name: backup_file_name(&bundle),
            content: to_json(&bundle)?,
        })
    }

    /// Valida o arquivo inteiro antes de tocar no banco.
    pub async fn import(&self, tenant_id: Uuid, raw: &str) -> Result<RestoreReport, AppError> {
        let bundle = validate(raw).map_err(|e| {
            tracing::warn!(%tenant_id, error = %e, "backup rejeitado na validação");
            AppError::InvalidBackup(e)
        })?;
        self.coordinator.restore_tenant(tenant_id, bundle).await
    }

    pub async fn summary(&self, tenant_id: Uuid) -> Result<BackupSummary, AppError> {
        self.summary.get_summary(tenant_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::{
        memory::{fixtures, MemoryStore},
        validator::BackupValidationError,
    };
    use assert_matches::assert_matches;

    fn service(store: &MemoryStore) -> BackupService {
        BackupService::new(Arc::new(store.clone()), TaggedCache::new(None))
    }

    #[tokio::test]
    async fn exported_file_restores_into_another_tenant() {
        let source = Uuid::new_v4();
        let target = Uuid::new_v4();
        let store = MemoryStore::default();
        store.seed(source, fixtures::tenant_data(source)).await;
        let service = service(&store);

        let file = service.export(source).await.unwrap();
        assert!(file.file_name.starts_with("backup-food-finance-"));
        assert!(file.file_name.ends_with(".json"));

        let report = service.import(target, &file.content).await.unwrap();
        assert_eq!(report.purchase_items, 3);

        let restored = store.tables(target).await;
        assert_eq!(restored.suppliers.len(), 2);
        assert!(restored.suppliers.iter().all(|s| s.tenant_id == target));
        // A origem continua intacta.
        assert_eq!(store.tables(source).await.suppliers.len(), 2);
    }

    #[tokio::test]
    async fn malformed_file_never_touches_the_store() {
        let tenant = Uuid::new_v4();
        let store = MemoryStore::default();
        store.seed(tenant, fixtures::tenant_data(tenant)).await;
        let before = store.tables(tenant).await;

        let result = service(&store).import(tenant, "{ isto não é json").await;

        assert_matches!(result, Err(AppError::InvalidBackup(_)));
        assert_eq!(store.tables(tenant).await, before);
    }

    #[tokio::test]
    async fn newer_major_version_is_rejected() {
        let tenant = Uuid::new_v4();
        let store = MemoryStore::default();
        let raw = r#"{"version":"2.0.0","data":{}}"#;

        let result = service(&store).import(tenant, raw).await;

        assert_matches!(
            result,
            Err(AppError::InvalidBackup(BackupValidationError::UnsupportedVersion(_)))
        );
    }

    #[tokio::test]
    async fn summary_reflects_the_import() {
        let tenant = Uuid::new_v4();
        let store = MemoryStore::default();
        let service = service(&store);
        assert_eq!(service.summary(tenant).await.unwrap().sales, 0);

        let source = Uuid::new_v4();
        store.seed(source, fixtures::tenant_data(source)).await;
        let file = service.export(source).await.unwrap();
        service.import(tenant, &file.content).await.unwrap();

        assert_eq!(service.summary(tenant).await.unwrap().sales, 2);
    }
}
