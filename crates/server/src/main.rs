use std::sync::Arc;
use std::time::Duration;

use jobsboard::api;
use jobsboard::config;
use jobsboard::db;
use jobsboard::jobs::demo::demo_jobs;
use jobsboard::jobs::{JobSource, JobsRepo, MemoryJobSource};
use jobsboard::logging;
use jobsboard::store::TableJobsStore;

use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let cfg = config::Config::from_env()?;

    info!(
        bind_addr = %cfg.bind_addr,
        page_size = cfg.page_size,
        max_jobs = cfg.max_jobs,
        poll_interval_secs = cfg.poll_interval_secs,
        database = if cfg.database_url.is_some() { "postgres" } else { "memory" },
        migrate_on_startup = cfg.migrate_on_startup,
        "jobsboard starting"
    );

    let source: Arc<dyn JobSource> = match cfg.database_url.as_deref() {
        Some(url) => {
            let pool = db::make_pool(url).await?;
            if cfg.migrate_on_startup {
                db::run_migrations(&pool).await?;
            }
            Arc::new(JobsRepo::new(pool))
        }
        None => {
            info!(jobs = cfg.seed_demo_jobs, "no database configured, serving in-memory jobs");
            Arc::new(MemoryJobSource::new(demo_jobs(cfg.seed_demo_jobs)))
        }
    };

    let store = TableJobsStore::new(source, cfg.page_size, cfg.max_jobs);
    if let Err(e) = store.refresh().await {
        warn!(error = %e, "initial job fetch failed; serving empty table");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ---- poller task ----
    let poller = if cfg.poll_interval_secs > 0 {
        let store = store.clone();
        let every = Duration::from_secs(cfg.poll_interval_secs);
        Some(tokio::spawn(async move {
            store.run_poller(every, shutdown_rx).await;
        }))
    } else {
        None
    };

    // ---- API task ----
    let app = api::router(api::ApiState {
        store,
        max_jobs: cfg.max_jobs,
    });
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    info!(addr = %cfg.bind_addr, "dashboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
            }
            info!("shutdown requested");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = poller {
        let _ = handle.await;
    }

    info!("jobsboard stopped");
    Ok(())
}
