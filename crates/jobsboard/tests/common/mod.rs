use chrono::{DateTime, TimeZone, Utc};
use jobsboard::jobs::JobRecord;
use sqlx::{postgres::PgPoolOptions, PgPool};

#[allow(dead_code)]
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

/// `n` completed jobs; job `i` is enqueued `i` seconds after the epoch base,
/// so the default newest-first order is `job-{n-1}` .. `job-0`.
#[allow(dead_code)]
pub fn jobs(n: usize) -> Vec<JobRecord> {
    (0..n).map(|i| job(&format!("job-{i}"), i as i64)).collect()
}

#[allow(dead_code)]
pub fn job(id: &str, enqueued: i64) -> JobRecord {
    JobRecord {
        id: id.to_string(),
        queue_name: "arq:queue".to_string(),
        function: "send_email".to_string(),
        status: "complete".to_string(),
        success: true,
        job_try: 1,
        enqueue_time: Some(at(enqueued)),
        start_time: Some(at(enqueued + 1)),
        finish_time: Some(at(enqueued + 2)),
        execution_duration: Some(1.0),
        args: "()".to_string(),
        kwargs: r#"{"to":"ops@example.com"}"#.to_string(),
        result: Some("null".to_string()),
    }
}

/// Connects to `TEST_DATABASE_URL`, migrates and truncates. `None` when the
/// variable is unset so database tests can be skipped locally.
#[allow(dead_code)]
pub async fn setup_db() -> Option<PgPool> {
    let _ = dotenvy::dotenv();

    let url = std::env::var("TEST_DATABASE_URL").ok()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("failed to connect to TEST_DATABASE_URL");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations failed");

    sqlx::query("TRUNCATE TABLE jobs")
        .execute(&pool)
        .await
        .expect("truncate failed");

    Some(pool)
}
