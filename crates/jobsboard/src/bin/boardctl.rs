use std::env;
use std::sync::Arc;

use jobsboard::config::Config;
use jobsboard::jobs::demo::demo_jobs;
use jobsboard::jobs::{JobSource, JobsQuery, JobsRepo, MemoryJobSource};
use jobsboard::store::TableJobsStore;
use jobsboard::{db, logging, view};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!(
            "boardctl <command>\n\
             Commands:\n\
             - migrate\n\
             - reset\n\
             - seed <n>\n\
             - list [limit]\n\
             - render [page]\n\
             \n\
             Uses JOBSBOARD_DATABASE_URL or DATABASE_URL; list/render fall back to demo data without one.\n"
        );
        std::process::exit(2);
    }

    logging::init_tracing();
    let cfg = Config::from_env()?;

    match args[1].as_str() {
        "migrate" => {
            connect(&cfg).await?;
            println!("migrations OK");
        }
        "reset" => {
            connect(&cfg).await?.truncate().await?;
            println!("reset OK");
        }
        "seed" => {
            let n: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(25);
            let repo = connect(&cfg).await?;
            for job in demo_jobs(n) {
                repo.upsert(&job).await?;
                println!("+ inserted job {} id={} status={}", job.function, job.id, job.status);
            }
        }
        "list" => {
            let limit: i64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(20);
            let source = source(&cfg).await?;
            let info = JobsQuery {
                limit,
                ..JobsQuery::default()
            }
            .apply(source.fetch_all(cfg.max_jobs).await?);

            println!(
                "jobs: total={} queued={} in_progress={} completed={} failed={}",
                info.statistics.total,
                info.statistics.queued,
                info.statistics.in_progress,
                info.statistics.completed,
                info.statistics.failed
            );
            for job in info.paged_jobs.items {
                let badge = view::format_status(&job.status, job.success);
                println!(
                    "{} | {} | {:<11} | {} | {}",
                    jobsboard::jobs::model::display_time(job.enqueue_time),
                    job.id,
                    badge.label,
                    job.function,
                    jobsboard::jobs::model::display_duration(job.execution_duration)
                );
            }
        }
        "render" => {
            let page: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1);
            let store = TableJobsStore::new(source(&cfg).await?, cfg.page_size, cfg.max_jobs);
            store.refresh().await?;
            if store.set_page(page) {
                store.refresh().await?;
            }
            println!("{}", view::render_dashboard(&store.snapshot()));
        }
        other => {
            eprintln!("Unknown command: {other}");
            std::process::exit(2);
        }
    }

    Ok(())
}

async fn connect(cfg: &Config) -> anyhow::Result<JobsRepo> {
    let url = cfg
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("JOBSBOARD_DATABASE_URL or DATABASE_URL must be set"))?;
    let pool = db::make_pool(url).await?;
    db::run_migrations(&pool).await?;
    Ok(JobsRepo::new(pool))
}

async fn source(cfg: &Config) -> anyhow::Result<Arc<dyn JobSource>> {
    if cfg.database_url.is_some() {
        Ok(Arc::new(connect(cfg).await?))
    } else {
        Ok(Arc::new(MemoryJobSource::new(demo_jobs(cfg.seed_demo_jobs.max(25)))))
    }
}
