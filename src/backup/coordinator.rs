// src/backup/coordinator.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    backup::{
        catalog::DELETE_ORDER,
        store::{BackupStore, InsertBatch, RestoreTransaction},
    },
    cache::{CacheScope, InvalidationBus},
    common::error::AppError,
    models::backup::{BackupBundle, BackupData, RestoreReport},
};

/// Troca todos os dados de um tenant pelo conteúdo de um bundle já validado.
#[derive(Clone)]
pub struct RestoreCoordinator {
    store: Arc<dyn BackupStore>,
    bus: Arc<dyn InvalidationBus>,
}

impl RestoreCoordinator {
    pub fn new(store: Arc<dyn BackupStore>, bus: Arc<dyn InvalidationBus>) -> Self {
        Self { store, bus }
    }

    /// Apaga tudo e recria numa única transação. Em qualquer falha a
    /// transação é desfeita e o tenant fica como estava.
    ///
    /// Os caches só são invalidados depois do commit.
    pub async fn restore_tenant(
        &self,
        tenant_id: Uuid,
        bundle: BackupBundle,
    ) -> Result<RestoreReport, AppError> {
        if bundle.tenant_id.as_deref().is_some_and(|origin| origin != tenant_id.to_string()) {
            tracing::info!(%tenant_id, origin = ?bundle.tenant_id, "importando backup de outro usuário");
        }
        let data = stamp_for_tenant(bundle.data, tenant_id);

        let mut tx = self
            .store
            .begin_restore(tenant_id)
            .await
            .map_err(|e| AppError::RestoreFailed(e.to_string()))?;

        let report = match replace_all(tx.as_mut(), &data).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(%tenant_id, error = %e, "restauração revertida");
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(%tenant_id, error = %rollback_err, "falha no rollback");
                }
                return Err(AppError::RestoreFailed(e.to_string()));
            }
        };

        tx.commit()
            .await
            .map_err(|e| AppError::RestoreFailed(e.to_string()))?;

        self.bus.invalidate_all(tenant_id, &CacheScope::ALL);
        tracing::info!(%tenant_id, ?report, "backup restaurado");
        Ok(report)
    }
}

async fn replace_all(
    tx: &mut dyn RestoreTransaction,
    data: &BackupData,
) -> Result<RestoreReport, AppError> {
    for kind in DELETE_ORDER {
        let removed = tx.delete_all(kind).await?;
        tracing::debug!(table = kind.table(), removed, "linhas apagadas");
    }
    for batch in restore_plan(data) {
        tx.insert(batch).await?;
    }
    Ok(report_for(data))
}

/// Passos de inserção, pais antes de filhos. Coleções vazias não geram passo.
pub fn restore_plan(data: &BackupData) -> Vec<InsertBatch<'_>> {
    let mut plan = Vec::new();

    if !data.suppliers.is_empty() {
        plan.push(InsertBatch::Suppliers(&data.suppliers));
    }
    if !data.stock_items.is_empty() {
        plan.push(InsertBatch::StockItems(&data.stock_items));
    }
    for entry in &data.purchases {
        plan.push(InsertBatch::Purchase {
            purchase: &entry.purchase,
            items: &entry.items,
        });
    }
    if !data.employees.is_empty() {
        plan.push(InsertBatch::Employees(&data.employees));
    }
    if !data.payments.is_empty() {
        plan.push(InsertBatch::Payments(&data.payments));
    }
    if !data.expense_categories.is_empty() {
        plan.push(InsertBatch::ExpenseCategories(&data.expense_categories));
    }
    if !data.expenses.is_empty() {
        plan.push(InsertBatch::Expenses(&data.expenses));
    }
    if !data.sales.is_empty() {
        plan.push(InsertBatch::Sales(&data.sales));
    }
    if let Some(store) = &data.store {
        plan.push(InsertBatch::Store(store));
    }

    plan
}

/// Carimba cada registro com o tenant que está restaurando. O dono gravado no
/// arquivo e o `purchaseId` dos itens não são confiáveis.
pub fn stamp_for_tenant(mut data: BackupData, tenant_id: Uuid) -> BackupData {
    data.suppliers.iter_mut().for_each(|r| r.tenant_id = tenant_id);
    data.stock_items.iter_mut().for_each(|r| r.tenant_id = tenant_id);
    data.employees.iter_mut().for_each(|r| r.tenant_id = tenant_id);
    data.payments.iter_mut().for_each(|r| r.tenant_id = tenant_id);
    data.expense_categories.iter_mut().for_each(|r| r.tenant_id = tenant_id);
    data.expenses.iter_mut().for_each(|r| r.tenant_id = tenant_id);
    data.sales.iter_mut().for_each(|r| r.tenant_id = tenant_id);
    for entry in &mut data.purchases {
        entry.purchase.tenant_id = tenant_id;
        let purchase_id = entry.purchase.id;
        for item in &mut entry.items {
            item.tenant_id = tenant_id;
            item.purchase_id = purchase_id;
        }
    }
    if let Some(store) = data.store.as_mut() {
        store.tenant_id = tenant_id;
    }
    data
}

fn report_for(data: &BackupData) -> RestoreReport {
    RestoreReport {
        suppliers: data.suppliers.len(),
        stock_items: data.stock_items.len(),
        purchases: data.purchases.len(),
        purchase_items: data.purchases.iter().map(|p| p.items.len()).sum(),
        employees: data.employees.len(),
        payments: data.payments.len(),
        expense_categories: data.expense_categories.len(),
        expenses: data.expenses.len(),
        sales: data.sales.len(),
        store: data.store.is_some(),
    }
}
