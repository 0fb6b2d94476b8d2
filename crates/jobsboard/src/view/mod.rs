//! Server-side rendering of the job table.

pub mod header;
pub mod html;
pub mod json;
pub mod pagination;
pub mod status;
pub mod table;

pub use header::{SortIndicator, SortableHeader, HEADERS};
pub use json::try_pretty_print;
pub use status::{format_status, BadgeColor, StatusBadge};
pub use table::{render_table, JobRowView};

use crate::store::ViewState;

/// Full dashboard page for a store snapshot.
pub fn render_dashboard(state: &ViewState) -> String {
    html::render_page(state.total_count, &render_table(state))
}
