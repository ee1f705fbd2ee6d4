//src/main.rs

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;

mod backup;
mod cache;
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Settings};
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env()?;
    let app_state = AppState::new(&settings).await?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = router(app_state);

    let listener = TcpListener::bind(settings.bind_addr)
        .await
        .context("Falha ao iniciar o listener TCP")?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await.context("Erro no servidor Axum")?;

    Ok(())
}

fn router(app_state: AppState) -> Router {
    let backup_routes = Router::new()
        .route("/export", get(handlers::backup::export_backup))
        .route(
            "/import",
            post(handlers::backup::import_backup)
                .layer(DefaultBodyLimit::max(handlers::backup::MAX_BACKUP_BYTES)),
        )
        .route("/summary", get(handlers::backup::get_backup_summary));

    let data_routes = Router::new()
        .route(
            "/suppliers",
            get(handlers::suppliers::list_suppliers).post(handlers::suppliers::create_supplier),
        )
        .route("/suppliers/{id}", delete(handlers::suppliers::delete_supplier))
        .route(
            "/stock-items",
            get(handlers::stock_items::list_stock_items).post(handlers::stock_items::create_stock_item),
        )
        .route(
            "/stock-items/{id}",
            put(handlers::stock_items::update_stock_item).delete(handlers::stock_items::delete_stock_item),
        )
        .route(
            "/employees",
            get(handlers::staff::list_employees).post(handlers::staff::create_employee),
        )
        .route(
            "/employees/{id}",
            put(handlers::staff::update_employee).delete(handlers::staff::delete_employee),
        )
        .route(
            "/payments",
            get(handlers::staff::list_payments).post(handlers::staff::create_payment),
        )
        .route(
            "/payments/{id}",
            get(handlers::staff::get_payment).delete(handlers::staff::delete_payment),
        )
        .route(
            "/expense-categories",
            get(handlers::expenses::list_categories).post(handlers::expenses::create_category),
        )
        .route("/expense-categories/{id}", delete(handlers::expenses::delete_category))
        .route(
            "/expenses",
            get(handlers::expenses::list_expenses).post(handlers::expenses::create_expense),
        )
        .route(
            "/expenses/{id}",
            put(handlers::expenses::update_expense).delete(handlers::expenses::delete_expense),
        )
        .route("/sales", get(handlers::sales::list_sales).post(handlers::sales::create_sale))
        .route(
            "/sales/{id}",
            put(handlers::sales::update_sale).delete(handlers::sales::delete_sale),
        )
        .route(
            "/purchases",
            get(handlers::purchases::list_purchases).post(handlers::purchases::create_purchase),
        )
        .route("/purchases/{id}", delete(handlers::purchases::delete_purchase))
        .route("/store", get(handlers::store::get_store).put(handlers::store::save_store))
        .route("/dashboard/metrics", get(handlers::dashboard::get_metrics))
        .route("/dashboard/low-stock", get(handlers::dashboard::get_low_stock))
        .route("/dashboard/chart", get(handlers::dashboard::get_chart_data));

    // Tudo dentro de /api (menos o health) exige o token
    let protected = Router::new()
        .nest("/backup", backup_routes)
        .merge(data_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(docs::ApiDoc::openapi()) }))
        .nest("/api", protected)
        .with_state(app_state)
}
