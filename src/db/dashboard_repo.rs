// src/db/dashboard_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::dashboard::{DailyTotal, LowStockItem}};

/// Itens com quantidade até este valor contam como estoque baixo.
pub const LOW_STOCK_THRESHOLD: Decimal = Decimal::ONE;
const LOW_STOCK_LIMIT: i64 = 10;

#[derive(Clone, Copy, Default)]
pub struct DashboardRepository;

/// Somas de um intervalo `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodTotals {
    pub sales: Decimal,
    pub purchases: Decimal,
    pub expenses: Decimal,
}

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    // 1. Totais do período (vendas, compras, despesas), todos na mesma transação
    pub async fn period_totals(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PeriodTotals, AppError> {
        let sales: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_value), 0)
            FROM sales
            WHERE tenant_id = $1 AND date >= $2 AND date < $3
            "#,
        )
        .bind(tenant_id)
        .bind(start)
        .bind(end)
        .fetch_one(&mut *conn)
        .await?;

        let purchases: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total), 0)
            FROM purchases
            WHERE tenant_id = $1 AND date >= $2 AND date < $3
            "#,
        )
        .bind(tenant_id)
        .bind(start)
        .bind(end)
        .fetch_one(&mut *conn)
        .await?;

        let expenses: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(value), 0)
            FROM expenses
            WHERE tenant_id = $1 AND date >= $2 AND date < $3
            "#,
        )
        .bind(tenant_id)
        .bind(start)
        .bind(end)
        .fetch_one(&mut *conn)
        .await?;

        Ok(PeriodTotals { sales, purchases, expenses })
    }

    // 2. Totais por dia (UTC) de vendas e despesas no intervalo `[start, end)`
    pub async fn daily_totals(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(Vec<DailyTotal>, Vec<DailyTotal>), AppError> {
        let sales = sqlx::query_as::<_, DailyTotal>(
            r#"
            SELECT (date AT TIME ZONE 'UTC')::date AS day, SUM(total_value) AS total
            FROM sales
            WHERE tenant_id = $1 AND date >= $2 AND date < $3
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(tenant_id)
        .bind(start)
        .bind(end)
        .fetch_all(&mut *conn)
        .await?;

        let expenses = sqlx::query_as::<_, DailyTotal>(
            r#"
            SELECT (date AT TIME ZONE 'UTC')::date AS day, SUM(value) AS total
            FROM expenses
            WHERE tenant_id = $1 AND date >= $2 AND date < $3
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(tenant_id)
        .bind(start)
        .bind(end)
        .fetch_all(&mut *conn)
        .await?;

        Ok((sales, expenses))
    }

    // 3. Estoque baixo (os que acabam primeiro aparecem primeiro)
    pub async fn low_stock<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<LowStockItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, LowStockItem>(
            r#"
            SELECT id, name, quantity, unit
            FROM stock_items
            WHERE tenant_id = $1 AND quantity <= $2
            ORDER BY quantity ASC, name ASC
            LIMIT $3
            "#,
        )
        .bind(tenant_id)
        .bind(LOW_STOCK_THRESHOLD)
        .bind(LOW_STOCK_LIMIT)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }
}
