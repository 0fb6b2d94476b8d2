use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::jobs::model::{JobRecord, JobStatus, SortColumn, SortOrder};

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 500;

/// Filter, ordering and window applied to the full job set before a page is
/// handed to the dashboard.
#[derive(Debug, Clone)]
pub struct JobsQuery {
    pub limit: i64,
    pub offset: i64,
    pub sort_by: SortColumn,
    pub sort_order: SortOrder,
    pub statuses: Vec<JobStatus>,
    pub success: Option<bool>,
    pub function: Option<String>,
    pub search: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub finish_time: Option<DateTime<Utc>>,
}

impl Default for JobsQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            sort_by: SortColumn::default(),
            sort_order: SortOrder::default(),
            statuses: Vec::new(),
            success: None,
            function: None,
            search: None,
            start_time: None,
            finish_time: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub queued: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub count: usize,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobsInfo {
    pub functions: Vec<String>,
    pub statistics: Statistics,
    pub paged_jobs: Paged<JobRecord>,
}

impl JobsQuery {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            anyhow::bail!("limit must be between 1 and {MAX_LIMIT}");
        }
        if self.offset < 0 {
            anyhow::bail!("offset must be >= 0");
        }
        Ok(())
    }

    pub fn apply(&self, jobs: Vec<JobRecord>) -> JobsInfo {
        // statistics and the function list describe the whole set, not the filtered one
        let functions: Vec<String> = jobs
            .iter()
            .map(|j| j.function.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let statistics = statistics(&jobs);

        let mut jobs: Vec<JobRecord> = jobs.into_iter().filter(|j| self.matches(j)).collect();
        sort_jobs(&mut jobs, self.sort_by, self.sort_order);

        let count = jobs.len();
        let start = (self.offset.max(0) as usize).min(count);
        let end = start.saturating_add(self.limit.max(0) as usize).min(count);
        let items = jobs.drain(start..end).collect();

        JobsInfo {
            functions,
            statistics,
            paged_jobs: Paged {
                items,
                count,
                limit: self.limit,
                offset: self.offset,
            },
        }
    }

    fn matches(&self, job: &JobRecord) -> bool {
        if let Some(from) = self.start_time {
            let enqueued = job.enqueue_time.is_some_and(|t| t >= from);
            let started = job.start_time.map_or(true, |t| t >= from);
            if !(enqueued && started) {
                return false;
            }
        }

        if let Some(until) = self.finish_time {
            let enqueued = job.enqueue_time.is_some_and(|t| t <= until);
            let finished = job.finish_time.map_or(true, |t| t <= until);
            if !(enqueued && finished) {
                return false;
            }
        }

        if !self.statuses.is_empty()
            && !job
                .parsed_status()
                .is_some_and(|s| self.statuses.contains(&s))
        {
            return false;
        }

        if self.success.is_some_and(|s| s != job.success) {
            return false;
        }

        if self.function.as_deref().is_some_and(|f| f != job.function) {
            return false;
        }

        match self.search.as_deref().filter(|s| !s.is_empty()) {
            Some(needle) => job.search_haystack().contains(&needle.to_lowercase()),
            None => true,
        }
    }
}

pub fn statistics(jobs: &[JobRecord]) -> Statistics {
    let mut out = Statistics {
        total: jobs.len(),
        ..Statistics::default()
    };
    for job in jobs {
        match job.parsed_status() {
            Some(JobStatus::InProgress) => out.in_progress += 1,
            Some(JobStatus::Queued) => out.queued += 1,
            Some(JobStatus::Complete) => {
                out.completed += 1;
                if !job.success {
                    out.failed += 1;
                }
            }
            _ => {}
        }
    }
    out
}

/// Stable sort. Ascending puts missing values last; descending is the exact
/// reverse, so missing values come first.
pub fn sort_jobs(jobs: &mut [JobRecord], column: SortColumn, order: SortOrder) {
    match order {
        SortOrder::Asc => jobs.sort_by(|a, b| compare_by(a, b, column)),
        SortOrder::Desc => jobs.sort_by(|a, b| compare_by(b, a, column)),
    }
}

fn compare_by(a: &JobRecord, b: &JobRecord, column: SortColumn) -> Ordering {
    match column {
        SortColumn::EnqueueTime => nulls_last(a.enqueue_time, b.enqueue_time, Ord::cmp),
        SortColumn::StartTime => nulls_last(a.start_time, b.start_time, Ord::cmp),
        SortColumn::ExecutionDuration => {
            nulls_last(a.execution_duration, b.execution_duration, |x, y| x.total_cmp(y))
        }
        SortColumn::Id => a.id.cmp(&b.id),
        SortColumn::Status => a.status.cmp(&b.status),
        SortColumn::Function => a.function.cmp(&b.function),
    }
}

fn nulls_last<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(&x, &y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn job(id: &str, status: &str, success: bool, duration: Option<f64>) -> JobRecord {
        JobRecord {
            id: id.to_string(),
            queue_name: "arq:queue".to_string(),
            function: format!("fn_{id}"),
            status: status.to_string(),
            success,
            job_try: 1,
            enqueue_time: Some(at(id.len() as i64)),
            start_time: None,
            finish_time: None,
            execution_duration: duration,
            args: "()".to_string(),
            kwargs: "{}".to_string(),
            result: None,
        }
    }

    fn ids(info: &JobsInfo) -> Vec<&str> {
        info.paged_jobs.items.iter().map(|j| j.id.as_str()).collect()
    }

    #[test]
    fn missing_durations_sort_last_ascending_and_first_descending() {
        let jobs = vec![
            job("a", "complete", true, Some(2.0)),
            job("b", "queued", false, None),
            job("c", "complete", true, Some(1.0)),
        ];

        let asc = JobsQuery {
            sort_by: SortColumn::ExecutionDuration,
            sort_order: SortOrder::Asc,
            ..JobsQuery::default()
        }
        .apply(jobs.clone());
        assert_eq!(ids(&asc), vec!["c", "a", "b"]);

        let desc = JobsQuery {
            sort_by: SortColumn::ExecutionDuration,
            sort_order: SortOrder::Desc,
            ..JobsQuery::default()
        }
        .apply(jobs);
        assert_eq!(ids(&desc), vec!["b", "a", "c"]);
    }

    #[test]
    fn equal_keys_keep_source_order() {
        let jobs = vec![
            job("x", "queued", false, None),
            job("y", "queued", false, None),
            job("z", "queued", false, None),
        ];
        let info = JobsQuery {
            sort_by: SortColumn::Status,
            sort_order: SortOrder::Desc,
            ..JobsQuery::default()
        }
        .apply(jobs);
        assert_eq!(ids(&info), vec!["x", "y", "z"]);
    }

    #[test]
    fn paging_slices_after_filtering() {
        let jobs: Vec<JobRecord> = (0..7)
            .map(|i| job(&format!("j{i}"), "queued", false, None))
            .collect();
        let info = JobsQuery {
            limit: 3,
            offset: 6,
            sort_by: SortColumn::Id,
            sort_order: SortOrder::Asc,
            ..JobsQuery::default()
        }
        .apply(jobs);
        assert_eq!(info.paged_jobs.count, 7);
        assert_eq!(ids(&info), vec!["j6"]);
    }

    #[test]
    fn offset_past_end_yields_empty_page() {
        let info = JobsQuery {
            offset: 10,
            ..JobsQuery::default()
        }
        .apply(vec![job("a", "queued", false, None)]);
        assert!(info.paged_jobs.items.is_empty());
        assert_eq!(info.paged_jobs.count, 1);
    }

    #[test]
    fn statistics_cover_unfiltered_set() {
        let jobs = vec![
            job("a", "complete", true, None),
            job("b", "complete", false, None),
            job("c", "in_progress", false, None),
            job("d", "queued", false, None),
            job("e", "mystery", false, None),
        ];
        let info = JobsQuery {
            statuses: vec![JobStatus::Queued],
            ..JobsQuery::default()
        }
        .apply(jobs);

        assert_eq!(ids(&info), vec!["d"]);
        assert_eq!(
            info.statistics,
            Statistics {
                total: 5,
                in_progress: 1,
                completed: 2,
                queued: 1,
                failed: 1,
            }
        );
        assert_eq!(info.functions.len(), 5);
    }

    #[test]
    fn success_function_and_search_filters() {
        let mut send = job("1", "complete", true, None);
        send.function = "send_email".to_string();
        send.kwargs = r#"{"to": "Ops@Example.com"}"#.to_string();
        let mut fail = job("2", "complete", false, None);
        fail.function = "send_email".to_string();
        let other = job("3", "complete", true, None);

        let jobs = vec![send, fail, other];

        let by_success = JobsQuery {
            success: Some(false),
            ..JobsQuery::default()
        }
        .apply(jobs.clone());
        assert_eq!(ids(&by_success), vec!["2"]);

        let by_function = JobsQuery {
            function: Some("send_email".to_string()),
            sort_by: SortColumn::Id,
            sort_order: SortOrder::Asc,
            ..JobsQuery::default()
        }
        .apply(jobs.clone());
        assert_eq!(ids(&by_function), vec!["1", "2"]);

        let by_search = JobsQuery {
            search: Some("ops@example".to_string()),
            ..JobsQuery::default()
        }
        .apply(jobs);
        assert_eq!(ids(&by_search), vec!["1"]);
    }

    #[test]
    fn time_window_filters() {
        let mut early = job("early", "complete", true, None);
        early.enqueue_time = Some(at(0));
        early.start_time = Some(at(5));
        early.finish_time = Some(at(10));

        let mut late = job("late", "queued", false, None);
        late.enqueue_time = Some(at(100));

        let jobs = vec![early, late];

        let from = JobsQuery {
            start_time: Some(at(50)),
            ..JobsQuery::default()
        }
        .apply(jobs.clone());
        assert_eq!(ids(&from), vec!["late"]);

        let until = JobsQuery {
            finish_time: Some(at(20)),
            ..JobsQuery::default()
        }
        .apply(jobs);
        assert_eq!(ids(&until), vec!["early"]);
    }

    #[test]
    fn limit_bounds_are_validated() {
        assert!(JobsQuery::default().validate().is_ok());
        for limit in [0, MAX_LIMIT + 1] {
            let q = JobsQuery {
                limit,
                ..JobsQuery::default()
            };
            assert!(q.validate().is_err());
        }
    }
}
