use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Opens the PostgreSQL connection pool shared by every handler.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Opening PostgreSQL pool...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    info!("PostgreSQL pool ready");
    Ok(pool)
}
