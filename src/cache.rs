// src/cache.rs
//
// Cache de leituras por tenant, invalidado por tag depois de cada mutação.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::common::error::AppError;

/// Visões de leitura que podem ficar em cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheScope {
    Suppliers,
    Purchases,
    StockItems,
    Employees,
    Payments,
    ExpenseCategories,
    Expenses,
    Sales,
    Store,
    BackupSummary,
    DashboardMetrics,
    ChartData,
    LowStock,
}

impl CacheScope {
    pub const ALL: [CacheScope; 13] = [
        CacheScope::Suppliers,
        CacheScope::Purchases,
        CacheScope::StockItems,
        CacheScope::Employees,
        CacheScope::Payments,
        CacheScope::ExpenseCategories,
        CacheScope::Expenses,
        CacheScope::Sales,
        CacheScope::Store,
        CacheScope::BackupSummary,
        CacheScope::DashboardMetrics,
        CacheScope::ChartData,
        CacheScope::LowStock,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            CacheScope::Suppliers => "suppliers",
            CacheScope::Purchases => "purchases",
            CacheScope::StockItems => "stock-items",
            CacheScope::Employees => "employees",
            CacheScope::Payments => "payments",
            CacheScope::ExpenseCategories => "expense-categories",
            CacheScope::Expenses => "expenses",
            CacheScope::Sales => "sales",
            CacheScope::Store => "store",
            CacheScope::BackupSummary => "backup-summary",
            CacheScope::DashboardMetrics => "dashboard-metrics",
            CacheScope::ChartData => "chart-data",
            CacheScope::LowStock => "low-stock",
        }
    }
}

/// Chave de invalidação: uma visão de um tenant (ex: `sales-<tenant>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheTag {
    pub scope: CacheScope,
    pub tenant_id: Uuid,
}

impl CacheTag {
    pub fn new(scope: CacheScope, tenant_id: Uuid) -> Self {
        Self { scope, tenant_id }
    }
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.scope.prefix(), self.tenant_id)
    }
}

/// Barramento de invalidação chamado depois que uma mutação é confirmada.
pub trait InvalidationBus: Send + Sync {
    fn invalidate(&self, tag: &CacheTag);

    fn invalidate_all(&self, tenant_id: Uuid, scopes: &[CacheScope]) {
        for scope in scopes {
            self.invalidate(&CacheTag::new(*scope, tenant_id));
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() > at)
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheTag, CacheEntry>,
    // Incrementada a cada invalidação; uma carga só grava se a geração não mudou.
    generations: HashMap<CacheTag, u64>,
}

/// Cache em memória: uma entrada JSON por tag.
#[derive(Debug, Clone)]
pub struct TaggedCache {
    state: Arc<RwLock<CacheState>>,
    ttl: Option<Duration>,
}

impl TaggedCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            state: Arc::new(RwLock::new(CacheState::default())),
            ttl,
        }
    }

    pub fn get<T: DeserializeOwned>(&self, tag: &CacheTag) -> Option<T> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let entry = state.entries.get(tag).filter(|e| !e.is_expired())?;
        serde_json::from_str(&entry.value).ok()
    }

    /// Geração atual da tag. Capture antes de carregar e passe para `set_if_current`.
    pub fn generation(&self, tag: &CacheTag) -> u64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generations
            .get(tag)
            .copied()
            .unwrap_or(0)
    }

    #[cfg(test)]
    pub fn set<T: Serialize>(&self, tag: CacheTag, value: &T) {
        let Some(entry) = self.entry_for(value) else {
            return;
        };
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .insert(tag, entry);
    }

    /// Grava só se nenhuma invalidação aconteceu desde `generation`.
    /// Devolve `false` quando o valor foi descartado.
    pub fn set_if_current<T: Serialize>(&self, tag: CacheTag, generation: u64, value: &T) -> bool {
        let Some(entry) = self.entry_for(value) else {
            return false;
        };
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.generations.get(&tag).copied().unwrap_or(0) != generation {
            tracing::debug!(tag = %tag, "carga obsoleta descartada");
            return false;
        }
        state.entries.insert(tag, entry);
        true
    }

    fn entry_for<T: Serialize>(&self, value: &T) -> Option<CacheEntry> {
        let value = serde_json::to_string(value).ok()?;
        Some(CacheEntry {
            value,
            expires_at: self.ttl.map(|d| Instant::now() + d),
        })
    }

    #[cfg(test)]
    pub fn contains(&self, tag: &CacheTag) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .get(tag)
            .is_some_and(|e| !e.is_expired())
    }

    /// Devolve a visão em cache ou carrega, guarda e devolve.
    /// Erros de carga não são guardados, nem cargas que cruzaram uma invalidação.
    pub async fn get_or_load<T, F, Fut>(&self, tag: CacheTag, load: F) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        if let Some(hit) = self.get::<T>(&tag) {
            tracing::debug!(tag = %tag, "cache hit");
            return Ok(hit);
        }
        let generation = self.generation(&tag);
        let value = load().await?;
        self.set_if_current(tag, generation, &value);
        Ok(value)
    }
}

impl InvalidationBus for TaggedCache {
    fn invalidate(&self, tag: &CacheTag) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state.generations.entry(*tag).or_insert(0) += 1;
        let removed = state.entries.remove(tag).is_some();
        drop(state);
        tracing::debug!(tag = %tag, removed, "cache invalidado");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_render_like_scope_dash_tenant() {
        let tenant = Uuid::nil();
        let tag = CacheTag::new(CacheScope::ExpenseCategories, tenant);
        assert_eq!(tag.to_string(), format!("expense-categories-{tenant}"));
    }

    #[tokio::test]
    async fn loads_once_until_invalidated() {
        let cache = TaggedCache::new(None);
        let tag = CacheTag::new(CacheScope::Sales, Uuid::new_v4());

        let first: Vec<i32> = cache.get_or_load(tag, || async { Ok(vec![1]) }).await.unwrap();
        let second: Vec<i32> = cache.get_or_load(tag, || async { Ok(vec![2]) }).await.unwrap();
        assert_eq!(first, vec![1]);
        assert_eq!(second, vec![1]);

        cache.invalidate(&tag);
        let third: Vec<i32> = cache.get_or_load(tag, || async { Ok(vec![3]) }).await.unwrap();
        assert_eq!(third, vec![3]);
    }

    #[tokio::test]
    async fn invalidation_is_scoped_to_one_tenant() {
        let cache = TaggedCache::new(None);
        let a = CacheTag::new(CacheScope::Sales, Uuid::new_v4());
        let b = CacheTag::new(CacheScope::Sales, Uuid::new_v4());
        cache.set(a, &1);
        cache.set(b, &2);

        cache.invalidate(&a);
        assert!(!cache.contains(&a));
        assert_eq!(cache.get::<i32>(&b), Some(2));
    }

    #[tokio::test]
    async fn load_errors_are_not_cached() {
        let cache = TaggedCache::new(None);
        let tag = CacheTag::new(CacheScope::Store, Uuid::new_v4());
        let failed: Result<i32, AppError> = cache
            .get_or_load(tag, || async { Err(AppError::NotFound("Loja")) })
            .await;
        assert!(failed.is_err());
        assert!(!cache.contains(&tag));
    }

    #[tokio::test]
    async fn invalidation_during_load_discards_the_loaded_value() {
        let cache = TaggedCache::new(None);
        let tag = CacheTag::new(CacheScope::BackupSummary, Uuid::new_v4());
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let loader = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_load(tag, || async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok(2)
                    })
                    .await
            })
        };

        started_rx.await.unwrap();
        cache.invalidate(&tag);
        release_tx.send(()).unwrap();

        // Quem carregou recebe o próprio valor, mas ele não fica em cache.
        assert_eq!(loader.await.unwrap().unwrap(), 2);
        assert!(!cache.contains(&tag));

        let fresh: i32 = cache.get_or_load(tag, || async { Ok(1) }).await.unwrap();
        assert_eq!(fresh, 1);
    }

    #[test]
    fn stale_generation_is_rejected() {
        let cache = TaggedCache::new(None);
        let tag = CacheTag::new(CacheScope::Sales, Uuid::new_v4());
        let generation = cache.generation(&tag);
        cache.invalidate(&tag);
        assert!(!cache.set_if_current(tag, generation, &1));
        assert!(cache.set_if_current(tag, cache.generation(&tag), &2));
        assert_eq!(cache.get::<i32>(&tag), Some(2));
    }

    #[test]
    fn expired_entries_are_misses() {
        let cache = TaggedCache::new(Some(Duration::ZERO));
        let tag = CacheTag::new(CacheScope::LowStock, Uuid::new_v4());
        cache.set(tag, &1);
        std::thread::sleep(Duration::from_millis(2));
        assert_eq!(cache.get::<i32>(&tag), None);
    }
}
