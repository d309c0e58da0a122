use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(5))
}

pub async fn create_pool(database_url: &str) -> PgPool {
    let pool = pool_options()
        .connect(database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool ready");
    pool
}

/// Pool that only connects on first use.
#[cfg(test)]
pub fn create_lazy_pool(database_url: &str) -> PgPool {
    pool_options()
        .connect_lazy(database_url)
        .expect("Invalid database URL")
}
