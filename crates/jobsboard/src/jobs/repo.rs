// crates/jobsboard/src/jobs/repo.rs

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

use sqlx::PgPool;

use crate::jobs::model::JobRecord;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Where the dashboard reads job records from.
pub trait JobSource: Send + Sync {
    /// Up to `max_jobs` records.
    fn fetch_all(&self, max_jobs: i64) -> BoxFuture<'_, anyhow::Result<Vec<JobRecord>>>;

    fn get_job<'a>(&'a self, id: &'a str) -> BoxFuture<'a, anyhow::Result<Option<JobRecord>>>;
}

const SELECT_COLUMNS: &str = r#"
    id, queue_name, function, status, success, job_try,
    enqueue_time, start_time, finish_time, execution_duration,
    args, kwargs, result
"#;

#[derive(Clone)]
pub struct JobsRepo {
    pool: PgPool,
}

impl JobsRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_recent(&self, max_jobs: i64) -> anyhow::Result<Vec<JobRecord>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM jobs ORDER BY enqueue_time DESC NULLS LAST, id LIMIT $1"
        );
        let rows = sqlx::query_as::<_, JobRecord>(&sql)
            .bind(max_jobs.max(0))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn find(&self, id: &str) -> anyhow::Result<Option<JobRecord>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM jobs WHERE id = $1");
        let row = sqlx::query_as::<_, JobRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Insert or overwrite a record. Used by `boardctl seed` and tests.
    pub async fn upsert(&self, job: &JobRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, queue_name, function, status, success, job_try,
                enqueue_time, start_time, finish_time, execution_duration,
                args, kwargs, result
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO UPDATE SET
                queue_name = EXCLUDED.queue_name,
                function = EXCLUDED.function,
                status = EXCLUDED.status,
                success = EXCLUDED.success,
                job_try = EXCLUDED.job_try,
                enqueue_time = EXCLUDED.enqueue_time,
                start_time = EXCLUDED.start_time,
                finish_time = EXCLUDED.finish_time,
                execution_duration = EXCLUDED.execution_duration,
                args = EXCLUDED.args,
                kwargs = EXCLUDED.kwargs,
                result = EXCLUDED.result
            "#,
        )
        .bind(&job.id)
        .bind(&job.queue_name)
        .bind(&job.function)
        .bind(&job.status)
        .bind(job.success)
        .bind(job.job_try)
        .bind(job.enqueue_time)
        .bind(job.start_time)
        .bind(job.finish_time)
        .bind(job.execution_duration)
        .bind(&job.args)
        .bind(&job.kwargs)
        .bind(&job.result)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn truncate(&self) -> anyhow::Result<()> {
        sqlx::query("TRUNCATE TABLE jobs").execute(&self.pool).await?;
        Ok(())
    }
}

impl JobSource for JobsRepo {
    fn fetch_all(&self, max_jobs: i64) -> BoxFuture<'_, anyhow::Result<Vec<JobRecord>>> {
        Box::pin(self.list_recent(max_jobs))
    }

    fn get_job<'a>(&'a self, id: &'a str) -> BoxFuture<'a, anyhow::Result<Option<JobRecord>>> {
        Box::pin(self.find(id))
    }
}

/// Job source backed by a vector. Serves demo data when no database is
/// configured, and backs the store and API tests.
#[derive(Clone, Default)]
pub struct MemoryJobSource {
    jobs: Arc<RwLock<Vec<JobRecord>>>,
}

impl MemoryJobSource {
    pub fn new(jobs: Vec<JobRecord>) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(jobs)),
        }
    }

    /// Replace the whole data set, as a backend refetch would.
    pub fn replace(&self, jobs: Vec<JobRecord>) {
        if let Ok(mut guard) = self.jobs.write() {
            *guard = jobs;
        }
    }

    fn read(&self) -> anyhow::Result<Vec<JobRecord>> {
        self.jobs
            .read()
            .map(|g| g.clone())
            .map_err(|_| anyhow::anyhow!("memory job source lock poisoned"))
    }
}

impl JobSource for MemoryJobSource {
    fn fetch_all(&self, max_jobs: i64) -> BoxFuture<'_, anyhow::Result<Vec<JobRecord>>> {
        Box::pin(async move {
            let mut jobs = self.read()?;
            jobs.truncate(max_jobs.max(0) as usize);
            Ok(jobs)
        })
    }

    fn get_job<'a>(&'a self, id: &'a str) -> BoxFuture<'a, anyhow::Result<Option<JobRecord>>> {
        Box::pin(async move { Ok(self.read()?.into_iter().find(|j| j.id == id)) })
    }
}
