use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::common::error::AppError;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Abre uma transação e define `app.tenant_id` (local à transação) para as policies RLS.
/// Todo acesso a dados passa por aqui: fora dela as tabelas não devolvem linhas.
pub(crate) async fn begin_tenant_tx(
    pool: &PgPool,
    tenant_id: Uuid,
) -> Result<Transaction<'static, Postgres>, AppError> {
    // O operador '?' converte automaticamente sqlx::Error -> AppError::DatabaseError
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT set_config('app.tenant_id', $1, true)")
        .bind(tenant_id.to_string())
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}

/// Serializa restaurações concorrentes do mesmo tenant até o fim da transação.
pub(crate) async fn lock_tenant(
    tx: &mut Transaction<'static, Postgres>,
    tenant_id: Uuid,
) -> Result<(), AppError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(tenant_id.to_string())
        .execute(&mut **tx)
        .await?;
    Ok(())
}
