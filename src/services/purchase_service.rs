// src/services/purchase_service.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    cache::{CacheScope, CacheTag, InvalidationBus, TaggedCache},
    common::{db_utils::begin_tenant_tx, error::AppError},
    db::PurchaseRepository,
    models::purchase::{Purchase, PurchaseItem, PurchasePayload, PurchaseWithItems},
};

// Compras não movimentam o estoque: só a lista, o painel e o resumo mudam.
const PURCHASE_SCOPES: [CacheScope; 3] = [
    CacheScope::Purchases,
    CacheScope::DashboardMetrics,
    CacheScope::BackupSummary,
];

/// Monta a compra com ids novos e totais calculados a partir dos itens.
pub fn build_purchase(tenant_id: Uuid, payload: PurchasePayload, now: DateTime<Utc>) -> PurchaseWithItems {
    let purchase_id = Uuid::new_v4();
    let total = payload.compute_total();

    let items = payload
        .items
        .into_iter()
        .map(|item| PurchaseItem {
            id: Uuid::new_v4(),
            tenant_id,
            purchase_id,
            stock_item_id: item.stock_item_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            total: PurchaseItem::compute_total(item.quantity, item.unit_price),
            created_at: now,
        })
        .collect();

    PurchaseWithItems {
        purchase: Purchase {
            id: purchase_id,
            tenant_id,
            supplier_id: payload.supplier_id,
            date: payload.date,
            payment_method: payload.payment_method,
            notes: payload.notes,
            total,
            created_at: now,
            updated_at: now,
        },
        items,
    }
}

#[derive(Clone)]
pub struct PurchaseService {
    pool: PgPool,
    purchase_repo: PurchaseRepository,
    cache: TaggedCache,
}

impl PurchaseService {
    pub fn new(pool: PgPool, purchase_repo: PurchaseRepository, cache: TaggedCache) -> Self {
        Self { pool, purchase_repo, cache }
    }

    pub async fn list(&self, tenant_id: Uuid) -> Result<Vec<PurchaseWithItems>, AppError> {
        let tag = CacheTag::new(CacheScope::Purchases, tenant_id);
        self.cache
            .get_or_load(tag, || async {
                let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
                let purchases = self.purchase_repo.list_with_items(&mut tx, tenant_id).await?;
                tx.commit().await?;
                Ok(purchases)
            })
            .await
    }

    /// Grava a compra e os itens numa única transação.
    pub async fn create(&self, tenant_id: Uuid, payload: PurchasePayload) -> Result<PurchaseWithItems, AppError> {
        let created = build_purchase(tenant_id, payload, Utc::now());

        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        self.purchase_repo
            .insert_purchase(&mut tx, &created.purchase)
            .await
            .map_err(map_missing_reference)?;
        self.purchase_repo
            .insert_items(&mut tx, &created.items)
            .await
            .map_err(map_missing_reference)?;
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            purchase_id = %created.purchase.id,
            items = created.items.len(),
            "compra registrada"
        );
        self.cache.invalidate_all(tenant_id, &PURCHASE_SCOPES);
        Ok(created)
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        if self.purchase_repo.delete(&mut tx, tenant_id, id).await? == 0 {
            return Err(AppError::NotFound("Compra"));
        }
        tx.commit().await?;

        self.cache.invalidate_all(tenant_id, &PURCHASE_SCOPES);
        Ok(())
    }
}

// Fornecedor ou item de estoque que não existe neste tenant cai na FK composta.
fn map_missing_reference(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return AppError::NotFound("Fornecedor ou item de estoque");
        }
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::purchase::PurchaseItemPayload;
    use rust_decimal_macros::dec;

    fn payload() -> PurchasePayload {
        PurchasePayload {
            supplier_id: Uuid::new_v4(),
            date: Utc::now(),
            payment_method: "PIX".into(),
            notes: Some("entrega de segunda".into()),
            items: vec![
                PurchaseItemPayload {
                    stock_item_id: Uuid::new_v4(),
                    quantity: dec!(2),
                    unit_price: dec!(10.99),
                },
                PurchaseItemPayload {
                    stock_item_id: Uuid::new_v4(),
                    quantity: dec!(0.5),
                    unit_price: dec!(43.96),
                },
            ],
        }
    }

    #[test]
    fn items_belong_to_the_new_purchase_and_tenant() {
        let tenant = Uuid::new_v4();
        let built = build_purchase(tenant, payload(), Utc::now());

        assert_eq!(built.purchase.tenant_id, tenant);
        assert_eq!(built.items.len(), 2);
        for item in &built.items {
            assert_eq!(item.purchase_id, built.purchase.id);
            assert_eq!(item.tenant_id, tenant);
        }
        assert_ne!(built.items[0].id, built.items[1].id);
    }

    #[test]
    fn totals_are_exact_decimals() {
        let built = build_purchase(Uuid::new_v4(), payload(), Utc::now());

        assert_eq!(built.items[0].total, dec!(21.98));
        assert_eq!(built.items[1].total, dec!(21.98));
        assert_eq!(built.purchase.total, dec!(43.96));
    }
}
