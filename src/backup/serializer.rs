// src/backup/serializer.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    backup::store::BackupStore,
    common::error::AppError,
    models::backup::{BackupBundle, BackupData, BACKUP_FORMAT_VERSION},
};

/// Lê todas as coleções do tenant em paralelo e monta o bundle versionado.
/// Qualquer falha de leitura derruba a exportação inteira.
pub async fn export_tenant(store: &dyn BackupStore, tenant_id: Uuid) -> Result<BackupBundle, AppError> {
    let (
        suppliers,
        purchases,
        stock_items,
        employees,
        payments,
        expense_categories,
        expenses,
        sales,
        store_profile,
    ) = tokio::try_join!(
        store.suppliers(tenant_id),
        store.purchases(tenant_id),
        store.stock_items(tenant_id),
        store.employees(tenant_id),
        store.payments(tenant_id),
        store.expense_categories(tenant_id),
        store.expenses(tenant_id),
        store.sales(tenant_id),
        store.store(tenant_id),
    )
    .map_err(|e| AppError::ExportFailed(e.to_string()))?;

    tracing::info!(
        %tenant_id,
        suppliers = suppliers.len(),
        purchases = purchases.len(),
        stock_items = stock_items.len(),
        sales = sales.len(),
        "backup exportado"
    );

    Ok(BackupBundle {
        version: BACKUP_FORMAT_VERSION.to_string(),
        exported_at: Some(Utc::now()),
        tenant_id: Some(tenant_id.to_string()),
        data: BackupData {
            suppliers,
            purchases,
            stock_items,
            employees,
            payments,
            expense_categories,
            expenses,
            sales,
            store: store_profile,
        },
    })
}

/// Nome sugerido para o download.
pub fn backup_file_name(bundle: &BackupBundle) -> String {
    let day = bundle.exported_at.unwrap_or_else(Utc::now).format("%Y-%m-%d");
    format!("backup-food-finance-{day}.json")
}

pub fn to_json(bundle: &BackupBundle) -> Result<String, AppError> {
    serde_json::to_string_pretty(bundle)
        .map_err(|e| AppError::ExportFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::memory::{fixtures, MemoryStore};
    use serde_json::Value;

    fn assert_only_json_primitives(value: &Value) {
        match value {
            Value::Array(items) => items.iter().for_each(assert_only_json_primitives),
            Value::Object(map) => map.values().for_each(assert_only_json_primitives),
            Value::Number(n) => assert!(n.is_i64() || n.is_u64(), "float no backup: {n}"),
            _ => {}
        }
    }

    #[tokio::test]
    async fn bundle_is_versioned_and_self_describing() {
        let tenant = Uuid::new_v4();
        let store = MemoryStore::default();
        store.seed(tenant, fixtures::tenant_data(tenant)).await;

        let bundle = export_tenant(&store, tenant).await.unwrap();

        assert_eq!(bundle.version, "1.0.0");
        assert!(bundle.exported_at.is_some());
        assert_eq!(bundle.tenant_id, Some(tenant.to_string()));
        assert_eq!(bundle.data.purchases.len(), 2);
        assert!(bundle.data.store.is_some());
    }

    #[tokio::test]
    async fn money_and_dates_are_strings_never_floats() {
        let tenant = Uuid::new_v4();
        let store = MemoryStore::default();
        store.seed(tenant, fixtures::tenant_data(tenant)).await;

        let bundle = export_tenant(&store, tenant).await.unwrap();
        let json: Value = serde_json::from_str(&to_json(&bundle).unwrap()).unwrap();

        assert_only_json_primitives(&json);
        let item = &json["data"]["stockItems"][0];
        assert!(item["unitCost"].is_string());
        assert!(item["totalValue"].is_string());
        assert!(item["createdAt"].is_string());
        assert!(json["data"]["purchases"][0]["items"][0]["unitPrice"].is_string());
        assert!(json["exportedAt"].is_string());
    }

    #[tokio::test]
    async fn empty_tenant_exports_empty_collections_and_null_store() {
        let store = MemoryStore::default();
        let bundle = export_tenant(&store, Uuid::new_v4()).await.unwrap();
        let json: Value = serde_json::to_value(&bundle).unwrap();

        assert_eq!(json["data"]["sales"], Value::Array(vec![]));
        assert_eq!(json["data"]["store"], Value::Null);
    }

    #[tokio::test]
    async fn export_never_leaks_rows_of_another_tenant() {
        let tenant_a = Uuid::new_v4();
        let tenant_b = Uuid::new_v4();
        let store = MemoryStore::default();
        // Mesmos ids de registro nos dois tenants.
        store.seed(tenant_a, fixtures::tenant_data(tenant_a)).await;
        store.seed(tenant_b, fixtures::with_tenant(fixtures::tenant_data(tenant_a), tenant_b)).await;

        let bundle = export_tenant(&store, tenant_a).await.unwrap();
        let data = &bundle.data;

        assert!(data.suppliers.iter().all(|r| r.tenant_id == tenant_a));
        assert!(data.stock_items.iter().all(|r| r.tenant_id == tenant_a));
        assert!(data.employees.iter().all(|r| r.tenant_id == tenant_a));
        assert!(data.payments.iter().all(|r| r.tenant_id == tenant_a));
        assert!(data.expense_categories.iter().all(|r| r.tenant_id == tenant_a));
        assert!(data.expenses.iter().all(|r| r.tenant_id == tenant_a));
        assert!(data.sales.iter().all(|r| r.tenant_id == tenant_a));
        assert!(data.purchases.iter().all(|p| {
            p.purchase.tenant_id == tenant_a && p.items.iter().all(|i| i.tenant_id == tenant_a)
        }));
        assert!(data.store.iter().all(|s| s.tenant_id == tenant_a));
        assert_eq!(data.expense_categories.len(), 2);
    }

    #[tokio::test]
    async fn a_failing_read_fails_the_whole_export() {
        let tenant = Uuid::new_v4();
        let store = MemoryStore::default();
        store.seed(tenant, fixtures::tenant_data(tenant)).await;
        store.fail_reads();

        let result = export_tenant(&store, tenant).await;
        assert!(matches!(result, Err(AppError::ExportFailed(_))));
    }

    #[test]
    fn file_name_uses_the_export_day() {
        let bundle = BackupBundle {
            version: BACKUP_FORMAT_VERSION.into(),
            exported_at: Some("2024-03-09T12:00:00Z".parse().unwrap()),
            tenant_id: None,
            data: BackupData::default(),
        };
        assert_eq!(backup_file_name(&bundle), "backup-food-finance-2024-03-09.json");
    }
}
