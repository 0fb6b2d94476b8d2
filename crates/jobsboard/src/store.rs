//! Observable state behind the job table.
//!
//! The store owns everything the table reads (current page of jobs, sort,
//! paging, loading flag, expanded rows). Views take snapshots; interactions go
//! through the named mutators; `refresh` refetches from the job source.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::jobs::{JobRecord, JobSource, JobsQuery, SortColumn, SortOrder};

/// Job ids whose detail row is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedSet {
    ids: HashSet<String>,
}

impl ExpandedSet {
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn insert(&mut self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    /// Flip membership; returns whether the id is expanded afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.remove(id) {
            false
        } else {
            self.insert(id)
        }
    }

    /// Forget ids that are no longer on screen.
    pub fn retain_visible(&mut self, items: &[JobRecord]) {
        self.ids.retain(|id| items.iter().any(|j| &j.id == id));
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ViewState {
    pub items: Vec<JobRecord>,
    pub is_loading: bool,
    pub sort_by: SortColumn,
    pub sort_order: SortOrder,
    pub toggle_jobs: ExpandedSet,
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
    pub total_count: usize,
    generation: u64,
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            is_loading: false,
            sort_by: SortColumn::default(),
            sort_order: SortOrder::default(),
            toggle_jobs: ExpandedSet::default(),
            total_pages: 0,
            current_page: 1,
            page_size: page_size.max(1),
            total_count: 0,
            generation: 0,
        }
    }

    pub fn page_query(&self) -> JobsQuery {
        JobsQuery {
            limit: self.page_size as i64,
            offset: (self.current_page.saturating_sub(1) * self.page_size) as i64,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
            ..JobsQuery::default()
        }
    }

    /// Show the overlay and claim a new refresh generation.
    fn begin_refresh(&mut self) -> u64 {
        self.generation += 1;
        self.is_loading = true;
        self.generation
    }

    /// Settle the refresh started as `generation`. `None` is a failed fetch:
    /// the previous page stays. Returns false, touching nothing, once a newer
    /// refresh has started, so only the latest one clears `is_loading`.
    fn finish_refresh(&mut self, generation: u64, fetched: Option<Vec<JobRecord>>) -> bool {
        if self.generation != generation {
            return false;
        }
        match fetched {
            Some(jobs) => self.apply_fetch(jobs),
            None => self.is_loading = false,
        }
        true
    }

    fn apply_fetch(&mut self, jobs: Vec<JobRecord>) {
        self.total_count = jobs.len();
        self.total_pages = self.total_count.div_ceil(self.page_size);
        if self.total_pages > 0 && self.current_page > self.total_pages {
            self.current_page = self.total_pages;
        }
        self.current_page = self.current_page.max(1);

        let info = self.page_query().apply(jobs);
        self.items = info.paged_jobs.items;
        self.toggle_jobs.retain_visible(&self.items);
        self.is_loading = false;
    }
}

#[derive(Clone)]
pub struct TableJobsStore {
    state: Arc<watch::Sender<ViewState>>,
    source: Arc<dyn JobSource>,
    max_jobs: i64,
}

impl TableJobsStore {
    pub fn new(source: Arc<dyn JobSource>, page_size: usize, max_jobs: i64) -> Self {
        let (tx, _rx) = watch::channel(ViewState::new(page_size));
        Self {
            state: Arc::new(tx),
            source,
            max_jobs,
        }
    }

    pub fn source(&self) -> &Arc<dyn JobSource> {
        &self.source
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Header click. The active column flips direction; any other column
    /// becomes active, descending. Paging restarts at page 1.
    pub fn set_sort_by(&self, column: SortColumn) {
        self.state.send_modify(|s| {
            if s.sort_by == column {
                s.sort_order = s.sort_order.flipped();
            } else {
                s.sort_by = column;
                s.sort_order = SortOrder::Desc;
            }
            s.current_page = 1;
            debug!(sort_by = %s.sort_by, sort_order = s.sort_order.as_str(), "sort changed");
        });
    }

    /// Row click. Returns whether the row is expanded afterwards.
    pub fn set_toggle_job(&self, id: &str) -> bool {
        let mut expanded = false;
        self.state.send_modify(|s| {
            expanded = s.toggle_jobs.toggle(id);
        });
        expanded
    }

    /// Pagination click; the page is clamped to the known range. Returns
    /// whether the current page changed.
    pub fn set_page(&self, page: usize) -> bool {
        self.state.send_if_modified(|s| {
            let target = page.clamp(1, s.total_pages.max(1));
            if target == s.current_page {
                return false;
            }
            s.current_page = target;
            true
        })
    }

    /// Refetch the current page. A refresh overtaken by a newer one leaves
    /// the state to its successor.
    pub async fn refresh(&self) -> anyhow::Result<()> {
        let mut generation = 0;
        self.state.send_modify(|s| generation = s.begin_refresh());

        let (jobs, failure) = match self.source.fetch_all(self.max_jobs).await {
            Ok(jobs) => (Some(jobs), None),
            Err(e) => (None, Some(e)),
        };

        // the generation check and the update share one lock of the channel
        if !self
            .state
            .send_if_modified(|s| s.finish_refresh(generation, jobs))
        {
            debug!(generation, "refresh superseded");
            return Ok(());
        }

        if let Some(e) = failure {
            warn!(error = %e, "job refresh failed");
            return Err(e);
        }

        let s = self.state.borrow();
        debug!(
            page = s.current_page,
            total_pages = s.total_pages,
            items = s.items.len(),
            "jobs refreshed"
        );
        Ok(())
    }

    /// Refresh every `every` until `shutdown` flips to true.
    pub async fn run_poller(&self, every: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(interval_ms = every.as_millis() as u64, "job poller started");
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // errors are already logged by refresh
                    let _ = self.refresh().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("job poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_twice_restores_membership() {
        let mut set = ExpandedSet::default();
        assert!(set.toggle("42"));
        assert!(set.contains("42"));
        assert!(!set.toggle("42"));
        assert!(!set.contains("42"));
        assert!(set.is_empty());
    }

    #[test]
    fn page_query_offsets_by_page() {
        let mut state = ViewState::new(20);
        state.current_page = 3;
        let q = state.page_query();
        assert_eq!(q.limit, 20);
        assert_eq!(q.offset, 40);
    }

    fn record(id: &str) -> JobRecord {
        JobRecord {
            id: id.to_string(),
            queue_name: "arq:queue".to_string(),
            function: "noop".to_string(),
            status: "complete".to_string(),
            success: true,
            job_try: 1,
            enqueue_time: None,
            start_time: None,
            finish_time: None,
            execution_duration: None,
            args: "()".to_string(),
            kwargs: "{}".to_string(),
            result: None,
        }
    }

    #[test]
    fn stale_fetch_cannot_clear_loading_of_newer_refresh() {
        let mut state = ViewState::new(10);
        let first = state.begin_refresh();
        let second = state.begin_refresh();

        assert!(!state.finish_refresh(first, Some(vec![record("stale")])));
        assert!(state.is_loading);
        assert!(state.items.is_empty());

        assert!(!state.finish_refresh(first, None));
        assert!(state.is_loading);

        assert!(state.finish_refresh(second, Some(vec![record("fresh")])));
        assert!(!state.is_loading);
        assert_eq!(state.items[0].id, "fresh");
    }

    #[test]
    fn failed_fetch_keeps_items_and_clears_loading() {
        let mut state = ViewState::new(10);
        let generation = state.begin_refresh();
        state.finish_refresh(generation, Some(vec![record("a")]));

        let generation = state.begin_refresh();
        assert!(state.finish_refresh(generation, None));
        assert!(!state.is_loading);
        assert_eq!(state.items.len(), 1);
    }
}
