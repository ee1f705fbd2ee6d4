// src/config.rs

use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    cache::TaggedCache,
    db::{
        DashboardRepository, ExpenseRepository, PgBackupStore, PurchaseRepository, SaleRepository,
        StaffRepository, StockRepository, StoreRepository, SupplierRepository,
    },
    services::{
        auth::AuthService, backup_service::BackupService, dashboard_service::DashboardService,
        expense_service::ExpenseService, purchase_service::PurchaseService,
        sale_service::SaleService, staff_service::StaffService, stock_service::StockService,
        store_service::StoreService, supplier_service::SupplierService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Configuração lida das variáveis de ambiente.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    /// `None` = entradas do cache não expiram (só invalidação).
    pub cache_ttl: Option<Duration>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR inválido (esperado host:porta)")?;

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .context("DATABASE_MAX_CONNECTIONS deve ser um número")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let ttl_secs: u64 = match lookup("CACHE_TTL_SECS") {
            Some(raw) => raw.parse().context("CACHE_TTL_SECS deve ser um número")?,
            None => DEFAULT_CACHE_TTL_SECS,
        };
        let cache_ttl = (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs));

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            max_connections,
            cache_ttl,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub supplier_service: SupplierService,
    pub stock_service: StockService,
    pub staff_service: StaffService,
    pub expense_service: ExpenseService,
    pub sale_service: SaleService,
    pub purchase_service: PurchaseService,
    pub store_service: StoreService,
    pub dashboard_service: DashboardService,
    pub backup_service: BackupService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("falha ao conectar no banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, settings))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(db_pool: PgPool, settings: &Settings) -> Self {
        // Um único cache para todo o processo: as mutações invalidam o que as leituras guardam.
        let cache = TaggedCache::new(settings.cache_ttl);
        let backup_store = Arc::new(PgBackupStore::new(db_pool.clone()));

        Self {
            auth_service: AuthService::new(settings.jwt_secret.clone()),
            supplier_service: SupplierService::new(db_pool.clone(), SupplierRepository::new(), cache.clone()),
            stock_service: StockService::new(db_pool.clone(), StockRepository::new(), cache.clone()),
            staff_service: StaffService::new(db_pool.clone(), StaffRepository::new(), cache.clone()),
            expense_service: ExpenseService::new(db_pool.clone(), ExpenseRepository::new(), cache.clone()),
            sale_service: SaleService::new(db_pool.clone(), SaleRepository::new(), cache.clone()),
            purchase_service: PurchaseService::new(db_pool.clone(), PurchaseRepository::new(), cache.clone()),
            store_service: StoreService::new(db_pool.clone(), StoreRepository::new(), cache.clone()),
            dashboard_service: DashboardService::new(db_pool.clone(), DashboardRepository::new(), cache.clone()),
            backup_service: BackupService::new(backup_store, cache),
            db_pool,
        }
    }
}
