//! Persistence layer: connection pool, migrations, models, repositories.
//!
//! Repositories are zero-sized structs whose async methods take `&PgPool` as
//! the first argument. Every state-machine transition is a single guarded
//! `UPDATE ... RETURNING`, so the database row is the serialization point for
//! concurrent requests; no in-process locking is involved.

pub mod models;
pub mod repositories;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Shared connection pool type.
pub type DbPool = PgPool;

/// Maximum connections in the pool.
const MAX_CONNECTIONS: u32 = 10;

/// Create a connection pool for the given database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await
}

/// Run all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
