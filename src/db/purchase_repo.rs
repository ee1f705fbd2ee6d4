// src/db/purchase_repo.rs

use std::collections::HashMap;

use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::purchase::{Purchase, PurchaseItem, PurchaseWithItems},
};

// Limite de parâmetros do Postgres é 65535; 7 colunas por item.
const ITEM_CHUNK: usize = 1000;

#[derive(Clone, Copy, Default)]
pub struct PurchaseRepository;

impl PurchaseRepository {
    pub fn new() -> Self {
        Self
    }

    /// Compras do tenant com os itens aninhados (duas consultas, agrupadas em memória).
    pub async fn list_with_items(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
    ) -> Result<Vec<PurchaseWithItems>, AppError> {
        let purchases = sqlx::query_as::<_, Purchase>(
            "SELECT * FROM purchases WHERE tenant_id = $1 ORDER BY date DESC, created_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(&mut *conn)
        .await?;

        let items = sqlx::query_as::<_, PurchaseItem>(
            "SELECT * FROM purchase_items WHERE tenant_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(tenant_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(nest_items(purchases, items))
    }

    pub async fn insert_purchase(&self, conn: &mut PgConnection, purchase: &Purchase) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO purchases (id, tenant_id, supplier_id, date, payment_method, notes, total, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(purchase.id)
        .bind(purchase.tenant_id)
        .bind(purchase.supplier_id)
        .bind(purchase.date)
        .bind(&purchase.payment_method)
        .bind(&purchase.notes)
        .bind(purchase.total)
        .bind(purchase.created_at)
        .bind(purchase.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn insert_items(&self, conn: &mut PgConnection, items: &[PurchaseItem]) -> Result<(), sqlx::Error> {
        for chunk in items.chunks(ITEM_CHUNK) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO purchase_items (id, tenant_id, purchase_id, stock_item_id, quantity, unit_price, total, created_at) ",
            );
            builder.push_values(chunk, |mut row, item| {
                row.push_bind(item.id)
                    .push_bind(item.tenant_id)
                    .push_bind(item.purchase_id)
                    .push_bind(item.stock_item_id)
                    .push_bind(item.quantity)
                    .push_bind(item.unit_price)
                    .push_bind(item.total)
                    .push_bind(item.created_at);
            });
            builder.build().execute(&mut *conn).await?;
        }
        Ok(())
    }

    /// Itens saem junto com a compra (ON DELETE CASCADE).
    pub async fn delete(&self, conn: &mut PgConnection, tenant_id: Uuid, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM purchases WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Agrupa os itens debaixo de cada compra, mantendo a ordem das compras.
pub fn nest_items(purchases: Vec<Purchase>, items: Vec<PurchaseItem>) -> Vec<PurchaseWithItems> {
    let mut by_purchase: HashMap<Uuid, Vec<PurchaseItem>> = HashMap::new();
    for item in items {
        by_purchase.entry(item.purchase_id).or_default().push(item);
    }

    purchases
        .into_iter()
        .map(|purchase| PurchaseWithItems {
            items: by_purchase.remove(&purchase.id).unwrap_or_default(),
            purchase,
        })
        .collect()
}
