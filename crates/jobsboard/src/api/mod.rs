use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::jobs::query::DEFAULT_LIMIT;
use crate::jobs::{JobRecord, JobStatus, JobsInfo, JobsQuery, SortColumn, SortOrder};
use crate::store::TableJobsStore;
use crate::view::header::header_for;
use crate::view::{render_dashboard, render_table};

#[derive(Clone)]
pub struct ApiState {
    pub store: TableJobsStore,
    pub max_jobs: i64,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        // Dashboard
        .route("/", get(dashboard))
        .route("/table", get(table_fragment))
        // Table interactions
        .route("/ui/sort/:column", post(sort_by))
        .route("/ui/toggle/:id", post(toggle_job))
        .route("/ui/page/:page", post(set_page))
        .route("/ui/refresh", post(refresh))
        // JSON
        .route("/jobs", get(list_jobs))
        .route("/jobs/:id", get(get_job))
        // Health
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Job with id {0} not found.")]
    JobNotFound(String),

    #[error("Unknown sort column: {0}.")]
    UnknownColumn(String),

    #[error("{0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

// Query strings that do not deserialize are validation failures, not the
// extractor's plain-text 400.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::JobNotFound(_) | ApiError::UnknownColumn(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(e) => {
                error!(error = %e, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub async fn dashboard(State(state): State<ApiState>) -> Html<String> {
    Html(render_dashboard(&state.store.snapshot()))
}

pub async fn table_fragment(State(state): State<ApiState>) -> Html<String> {
    Html(render_table(&state.store.snapshot()))
}

async fn refresh_or_log(store: &TableJobsStore) {
    if let Err(e) = store.refresh().await {
        warn!(error = %e, "refresh after table interaction failed");
    }
}

pub async fn sort_by(
    State(state): State<ApiState>,
    Path(column): Path<String>,
) -> Result<Redirect, ApiError> {
    let header = column
        .parse::<SortColumn>()
        .ok()
        .and_then(header_for)
        .ok_or_else(|| ApiError::UnknownColumn(column.clone()))?;

    header.click(&state.store);
    refresh_or_log(&state.store).await;
    Ok(Redirect::to("/"))
}

pub async fn toggle_job(State(state): State<ApiState>, Path(id): Path<String>) -> Redirect {
    let expanded = state.store.set_toggle_job(&id);
    debug!(job_id = %id, expanded, "row toggled");
    Redirect::to("/")
}

pub async fn set_page(State(state): State<ApiState>, Path(page): Path<usize>) -> Redirect {
    if state.store.set_page(page) {
        refresh_or_log(&state.store).await;
    }
    Redirect::to("/")
}

pub async fn refresh(State(state): State<ApiState>) -> Redirect {
    refresh_or_log(&state.store).await;
    Redirect::to("/")
}

#[derive(Debug, Default, Deserialize)]
pub struct ListJobsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sort_by: Option<SortColumn>,
    pub sort_order: Option<SortOrder>,
    /// Filled from every `statuses=` pair by `list_jobs`; each value may
    /// itself be comma-separated, e.g. `queued,in_progress`.
    #[serde(skip)]
    pub statuses: Vec<String>,
    pub success: Option<bool>,
    pub function: Option<String>,
    pub search: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub finish_time: Option<DateTime<Utc>>,
}

impl TryFrom<ListJobsQuery> for JobsQuery {
    type Error = ApiError;

    fn try_from(q: ListJobsQuery) -> Result<Self, Self::Error> {
        let statuses = q
            .statuses
            .iter()
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<JobStatus>())
            .collect::<anyhow::Result<Vec<_>>>()
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        let query = JobsQuery {
            limit: q.limit.unwrap_or(DEFAULT_LIMIT),
            offset: q.offset.unwrap_or(0),
            sort_by: q.sort_by.unwrap_or_default(),
            sort_order: q.sort_order.unwrap_or_default(),
            statuses,
            success: q.success,
            function: q.function.filter(|f| !f.is_empty()),
            search: q.search.filter(|s| !s.is_empty()),
            start_time: q.start_time,
            finish_time: q.finish_time,
        };
        query
            .validate()
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        Ok(query)
    }
}

pub async fn list_jobs(
    State(state): State<ApiState>,
    query: Result<Query<ListJobsQuery>, QueryRejection>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<JobsInfo>, ApiError> {
    let Query(mut q) = query?;
    let Query(pairs) = pairs?;
    // repeated keys (`statuses=a&statuses=b`) only survive in the raw pairs
    q.statuses = pairs
        .into_iter()
        .filter(|(key, _)| key == "statuses")
        .map(|(_, value)| value)
        .collect();

    let query = JobsQuery::try_from(q)?;
    let jobs = state.store.source().fetch_all(state.max_jobs).await?;
    Ok(Json(query.apply(jobs)))
}

pub async fn get_job(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<JobRecord>, ApiError> {
    let job = state.store.source().get_job(&id).await?;
    job.map(Json).ok_or(ApiError::JobNotFound(id))
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
