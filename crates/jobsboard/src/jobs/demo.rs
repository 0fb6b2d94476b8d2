use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::jobs::model::{JobRecord, JobStatus};

const FUNCTIONS: [&str; 4] = ["send_email", "resize_image", "sync_inventory", "build_report"];

/// Plausible-looking job history for local runs without a database.
pub fn demo_jobs(n: usize) -> Vec<JobRecord> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    (0..n)
        .map(|i| {
            let function = FUNCTIONS.choose(&mut rng).copied().unwrap_or("send_email");
            let status = match rng.gen_range(0..10) {
                0 => JobStatus::Queued,
                1 => JobStatus::Deferred,
                2 => JobStatus::InProgress,
                _ => JobStatus::Complete,
            };
            let enqueue_time = now - Duration::seconds(30 * i as i64 + rng.gen_range(0..30));
            let started = !matches!(status, JobStatus::Queued | JobStatus::Deferred);
            let start_time = started.then(|| enqueue_time + Duration::milliseconds(rng.gen_range(5..2_000)));
            let duration = (status == JobStatus::Complete).then(|| rng.gen_range(0.01..12.0_f64));
            let finish_time = match (start_time, duration) {
                (Some(start), Some(secs)) => Some(start + Duration::milliseconds((secs * 1000.0) as i64)),
                _ => None,
            };
            let success = status == JobStatus::Complete && rng.gen_bool(0.8);
            let result = match (status, success) {
                (JobStatus::Complete, true) => Some(format!(r#"{{"ok": true, "processed": {}}}"#, rng.gen_range(1..500))),
                (JobStatus::Complete, false) => Some("TimeoutError('upstream did not answer')".to_string()),
                _ => None,
            };

            JobRecord {
                id: Uuid::new_v4().simple().to_string(),
                queue_name: "arq:queue".to_string(),
                function: function.to_string(),
                status: status.as_str().to_string(),
                success,
                job_try: if success { 1 } else { rng.gen_range(1..4) },
                enqueue_time: Some(enqueue_time),
                start_time,
                finish_time,
                execution_duration: duration,
                args: format!("({},)", i),
                kwargs: format!(r#"{{"tenant": "t{}", "retry": {}}}"#, i % 5, i % 2 == 0),
                result,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_jobs_are_consistent() {
        let jobs = demo_jobs(40);
        assert_eq!(jobs.len(), 40);
        for job in &jobs {
            let status = job.parsed_status().unwrap();
            assert!(!job.success || status == JobStatus::Complete);
            assert_eq!(job.finish_time.is_some(), status == JobStatus::Complete);
            assert!(job.enqueue_time.is_some());
        }
    }
}
