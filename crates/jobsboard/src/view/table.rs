use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::jobs::model::{display_duration, display_time};
use crate::jobs::JobRecord;
use crate::store::ViewState;
use crate::view::header::HEADERS;
use crate::view::html::escape;
use crate::view::json::try_pretty_print;
use crate::view::pagination::render_pagination;
use crate::view::status::{format_status, StatusBadge};

// Unreserved characters stay readable; everything else is encoded.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Everything one job contributes to the table: the summary cells and the
/// detail panels.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRowView {
    pub id: String,
    pub enqueue_time: String,
    pub status: StatusBadge,
    pub function: String,
    pub start_time: String,
    pub execution_duration: String,
    pub expanded: bool,
    pub fields: Vec<(&'static str, String)>,
    pub args: String,
    pub kwargs: String,
    pub result: String,
}

impl JobRowView {
    pub fn new(job: &JobRecord, expanded: bool) -> Self {
        let fields = vec![
            ("id", job.id.clone()),
            ("queue name", job.queue_name.clone()),
            ("function", job.function.clone()),
            ("status", job.status.clone()),
            ("job try", job.job_try.to_string()),
            ("success", job.success.to_string()),
            ("enqueue time", display_time(job.enqueue_time)),
            ("start time", display_time(job.start_time)),
            ("finish time", display_time(job.finish_time)),
            ("execution duration (sec)", display_duration(job.execution_duration)),
        ];

        Self {
            id: job.id.clone(),
            enqueue_time: display_time(job.enqueue_time),
            status: format_status(&job.status, job.success),
            function: job.function.clone(),
            start_time: display_time(job.start_time),
            execution_duration: display_duration(job.execution_duration),
            expanded,
            fields,
            args: job.args.clone(),
            kwargs: try_pretty_print(&job.kwargs),
            // a job that has not finished shows `null`, like any JSON null result
            result: try_pretty_print(job.result.as_deref().unwrap_or("null")),
        }
    }

    /// Action the row-click script posts to. The id is a single path
    /// segment, so reserved characters (`/`, `#`, `?`) must be encoded.
    pub fn toggle_action(&self) -> String {
        format!(
            "/ui/toggle/{}",
            utf8_percent_encode(&self.id, PATH_SEGMENT)
        )
    }

    fn write_summary(&self, html: &mut String) {
        let id = escape(&self.id);
        html.push_str(&format!(
            r#"<tr class="summary" data-job-id="{id}" data-toggle="{toggle}"><td>{enqueued}</td><td>{id}</td><td><span class="badge badge-{color}" title="{label}">{text}</span></td><td>{function}</td><td>{started}</td><td>{duration}</td></tr>"#,
            toggle = escape(&self.toggle_action()),
            enqueued = escape(&self.enqueue_time),
            color = self.status.color.as_str(),
            label = escape(self.status.label),
            text = escape(&self.status.display_text),
            function = escape(&self.function),
            started = escape(&self.start_time),
            duration = escape(&self.execution_duration),
        ));
    }

    // Detail rows are always emitted; the `show` class decides visibility.
    fn write_detail(&self, html: &mut String) {
        let show = if self.expanded { " show" } else { "" };
        html.push_str(&format!(
            r#"<tr class="expander" data-detail-for="{}"><td colspan="{}"><div class="expanded-content{show}"><div><table class="fields"><tbody>"#,
            escape(&self.id),
            HEADERS.len()
        ));

        for (key, value) in &self.fields {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape(key),
                escape(value)
            ));
        }

        html.push_str(&format!(
            r#"</tbody></table></div><div>args:<pre class="args">{}</pre>kwargs:<pre class="kwargs">{}</pre>result:<pre class="result">{}</pre></div></div></td></tr>"#,
            escape(&self.args),
            escape(&self.kwargs),
            escape(&self.result)
        ));
    }
}

pub fn row_views(state: &ViewState) -> Vec<JobRowView> {
    state
        .items
        .iter()
        .map(|job| JobRowView::new(job, state.toggle_jobs.contains(&job.id)))
        .collect()
}

/// The job table for one store snapshot: overlay while loading, header row,
/// summary and detail row per job, pagination.
pub fn render_table(state: &ViewState) -> String {
    let mut html = String::new();

    html.push_str(r#"<div class="table-wrap">"#);
    if state.is_loading {
        html.push_str(r#"<div class="loading-overlay" role="status">Loading&hellip;</div>"#);
    }

    html.push_str(r#"<table class="jobs"><thead><tr>"#);
    for header in &HEADERS {
        html.push_str(&header.render(state.sort_by, state.sort_order));
    }
    html.push_str("</tr></thead><tbody>");

    let rows = row_views(state);
    if rows.is_empty() {
        html.push_str(&format!(
            r#"<tr class="empty"><td colspan="{}" class="muted">No jobs to show.</td></tr>"#,
            HEADERS.len()
        ));
    }
    for row in &rows {
        row.write_summary(&mut html);
        row.write_detail(&mut html);
    }
    html.push_str("</tbody></table></div>");

    html.push_str(&render_pagination(
        state.total_pages,
        state.current_page,
        state.is_loading,
    ));
    html
}
