// src/services/dashboard_service.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    cache::{CacheScope, CacheTag, TaggedCache},
    common::{db_utils::begin_tenant_tx, error::AppError},
    db::DashboardRepository,
    models::dashboard::{ChartDataPoint, DailyTotal, DashboardMetrics, LowStockItem},
};

/// Intervalo `[primeiro dia do mês, primeiro dia do mês seguinte)` em UTC.
pub fn month_bounds(now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let (next_year, next_month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    let start = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)?;
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some((
        start.and_hms_opt(0, 0, 0)?.and_utc(),
        end.and_hms_opt(0, 0, 0)?.and_utc(),
    ))
}

/// Dias mostrados no gráfico, contando hoje.
pub const CHART_DAYS: u64 = 7;

/// Janela do gráfico: do início do dia de seis dias atrás até o fim de hoje (UTC).
pub fn chart_window(today: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = today.checked_sub_days(Days::new(CHART_DAYS - 1))?;
    let after = today.checked_add_days(Days::new(1))?;
    Some((
        first.and_hms_opt(0, 0, 0)?.and_utc(),
        after.and_hms_opt(0, 0, 0)?.and_utc(),
    ))
}

/// Monta um ponto por dia da janela, com zero nos dias sem movimento.
/// Somas fora da janela são ignoradas.
pub fn build_chart(today: NaiveDate, sales: &[DailyTotal], expenses: &[DailyTotal]) -> Vec<ChartDataPoint> {
    let mut days: BTreeMap<NaiveDate, ChartDataPoint> = (0..CHART_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| {
            let point = ChartDataPoint { date, sales: Decimal::ZERO, expenses: Decimal::ZERO };
            (date, point)
        })
        .collect();

    for row in sales {
        if let Some(point) = days.get_mut(&row.day) {
            point.sales += row.total;
        }
    }
    for row in expenses {
        if let Some(point) = days.get_mut(&row.day) {
            point.expenses += row.total;
        }
    }
    days.into_values().collect()
}

#[derive(Clone)]
pub struct DashboardService {
    pool: PgPool,
    repo: DashboardRepository,
    cache: TaggedCache,
}

impl DashboardService {
    pub fn new(pool: PgPool, repo: DashboardRepository, cache: TaggedCache) -> Self {
        Self { pool, repo, cache }
    }

    pub async fn get_metrics(&self, tenant_id: Uuid) -> Result<DashboardMetrics, AppError> {
        let (start, end) = month_bounds(Utc::now())
            .ok_or_else(|| anyhow::anyhow!("data atual fora do intervalo suportado"))?;

        // A entrada guarda o mês a que se refere: na virada do mês ela é recalculada.
        let tag = CacheTag::new(CacheScope::DashboardMetrics, tenant_id);
        if let Some((month, metrics)) = self.cache.get::<(DateTime<Utc>, DashboardMetrics)>(&tag) {
            if month == start {
                return Ok(metrics);
            }
        }

        let generation = self.cache.generation(&tag);
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let totals = self.repo.period_totals(&mut tx, tenant_id, start, end).await?;
        tx.commit().await?;

        let metrics = DashboardMetrics::from_totals(totals.sales, totals.purchases, totals.expenses);
        self.cache.set_if_current(tag, generation, &(start, metrics.clone()));
        Ok(metrics)
    }

    pub async fn get_chart_data(&self, tenant_id: Uuid) -> Result<Vec<ChartDataPoint>, AppError> {
        let today = Utc::now().date_naive();
        let (start, end) = chart_window(today)
            .ok_or_else(|| anyhow::anyhow!("data atual fora do intervalo suportado"))?;

        // Mesmo esquema das métricas: a entrada lembra o dia em que foi montada.
        let tag = CacheTag::new(CacheScope::ChartData, tenant_id);
        if let Some((day, points)) = self.cache.get::<(NaiveDate, Vec<ChartDataPoint>)>(&tag) {
            if day == today {
                return Ok(points);
            }
        }

        let generation = self.cache.generation(&tag);
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let (sales, expenses) = self.repo.daily_totals(&mut tx, tenant_id, start, end).await?;
        tx.commit().await?;

        let points = build_chart(today, &sales, &expenses);
        self.cache.set_if_current(tag, generation, &(today, points.clone()));
        Ok(points)
    }

    pub async fn get_low_stock(&self, tenant_id: Uuid) -> Result<Vec<LowStockItem>, AppError> {
        let tag = CacheTag::new(CacheScope::LowStock, tenant_id);
        self.cache
            .get_or_load(tag, || async {
                let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
                let items = self.repo.low_stock(&mut *tx, tenant_id).await?;
                tx.commit().await?;
                Ok(items)
            })
            .await
    }
}
