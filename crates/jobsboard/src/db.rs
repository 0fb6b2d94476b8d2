use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Connection pool for the jobs table.
///
/// The dashboard only reads, and at most one refresh runs per poll tick plus
/// whatever the HTTP handlers ask for, so a small pool is enough. Both knobs
/// are clamped so a bad value cannot exhaust the server's connection limit or
/// hang startup forever.
pub async fn make_pool(database_url: &str) -> anyhow::Result<PgPool> {
    // JOBSBOARD_DB_MAX_CONNECTIONS: 1..=32, default 4
    let max_connections = std::env::var("JOBSBOARD_DB_MAX_CONNECTIONS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(4)
        .clamp(1, 32);

    // JOBSBOARD_DB_ACQUIRE_TIMEOUT_SECS: how long a query waits for a free
    // connection before it fails, 1..=60, default 10
    let acquire_timeout_secs = std::env::var("JOBSBOARD_DB_ACQUIRE_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(10)
        .clamp(1, 60);

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
        .connect(database_url)
        .await?;

    Ok(pool)
}

// The migrations are embedded at compile time from crates/jobsboard/migrations;
// sqlx records applied versions in `_sqlx_migrations`, so running this on
// every startup is safe.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
