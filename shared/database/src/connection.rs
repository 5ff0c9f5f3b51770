use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Pool, Postgres};

use mentorhub_common::{AppError, DatabaseConfig};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await
        .map_err(AppError::Database)?;

    // Fail fast on a broken connection string or unreachable server.
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(AppError::Database)?;

    tracing::info!("Database connection established");
    Ok(pool)
}

/// Pool that defers connecting until first use. Lets the HTTP surface be
/// exercised in tests that never reach the database.
pub fn create_lazy_pool(config: &DatabaseConfig) -> Result<PgPool, AppError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_lazy(&config.connection_string())
        .map_err(AppError::Database)
}
