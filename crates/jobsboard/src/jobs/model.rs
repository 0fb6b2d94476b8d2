use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One job as reported by the queue backend. Records are snapshots: the
/// store replaces them wholesale on every refetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobRecord {
    pub id: String,
    pub queue_name: String,
    pub function: String,

    // kept raw so unknown values reach the status badge untouched
    pub status: String,
    pub success: bool,
    pub job_try: i32,

    pub enqueue_time: Option<DateTime<Utc>>,
    pub start_time: Option<DateTime<Utc>>,
    pub finish_time: Option<DateTime<Utc>>,
    pub execution_duration: Option<f64>,

    pub args: String,
    pub kwargs: String,
    pub result: Option<String>,
}

impl JobRecord {
    pub fn parsed_status(&self) -> Option<JobStatus> {
        self.status.parse().ok()
    }

    /// Lowercased text of every field, used by the free-text search filter.
    pub fn search_haystack(&self) -> String {
        format!(
            "id={} queue_name={} function={} status={} success={} job_try={} enqueue_time={} start_time={} finish_time={} execution_duration={} args={} kwargs={} result={}",
            self.id,
            self.queue_name,
            self.function,
            self.status,
            self.success,
            self.job_try,
            display_time(self.enqueue_time),
            display_time(self.start_time),
            display_time(self.finish_time),
            display_duration(self.execution_duration),
            self.args,
            self.kwargs,
            self.result.as_deref().unwrap_or(""),
        )
        .to_lowercase()
    }
}

pub fn display_time(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
        .unwrap_or_default()
}

pub fn display_duration(value: Option<f64>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Deferred,
    InProgress,
    Complete,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Deferred => "deferred",
            JobStatus::InProgress => "in_progress",
            JobStatus::Complete => "complete",
        }
    }
}

impl FromStr for JobStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "deferred" => Ok(JobStatus::Deferred),
            "in_progress" => Ok(JobStatus::InProgress),
            "complete" => Ok(JobStatus::Complete),
            other => Err(anyhow::anyhow!("unknown job status: {other}")),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns the job list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    #[default]
    EnqueueTime,
    Id,
    Status,
    Function,
    StartTime,
    ExecutionDuration,
}

impl SortColumn {
    pub const ALL: [SortColumn; 6] = [
        SortColumn::EnqueueTime,
        SortColumn::Id,
        SortColumn::Status,
        SortColumn::Function,
        SortColumn::StartTime,
        SortColumn::ExecutionDuration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortColumn::EnqueueTime => "enqueue_time",
            SortColumn::Id => "id",
            SortColumn::Status => "status",
            SortColumn::Function => "function",
            SortColumn::StartTime => "start_time",
            SortColumn::ExecutionDuration => "execution_duration",
        }
    }
}

impl FromStr for SortColumn {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortColumn::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown sort column: {s}"))
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_closed_set_only() {
        for s in ["queued", "deferred", "in_progress", "complete"] {
            assert_eq!(s.parse::<JobStatus>().unwrap().as_str(), s);
        }
        assert!("running".parse::<JobStatus>().is_err());
    }

    #[test]
    fn sort_column_keys_round_trip() {
        for c in SortColumn::ALL {
            assert_eq!(c.as_str().parse::<SortColumn>().unwrap(), c);
        }
        assert!("queue".parse::<SortColumn>().is_err());
    }

    #[test]
    fn sort_order_flips() {
        assert_eq!(SortOrder::Asc.flipped(), SortOrder::Desc);
        assert_eq!(SortOrder::Desc.flipped(), SortOrder::Asc);
    }
}
