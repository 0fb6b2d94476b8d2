use crate::jobs::{SortColumn, SortOrder};
use crate::store::TableJobsStore;
use crate::view::html::escape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortIndicator {
    Neutral,
    Ascending,
    Descending,
}

impl SortIndicator {
    pub fn glyph(&self) -> &'static str {
        match self {
            SortIndicator::Neutral => "&#8597;",
            SortIndicator::Ascending => "&#9650;",
            SortIndicator::Descending => "&#9660;",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortIndicator::Neutral => "none",
            SortIndicator::Ascending => "ascending",
            SortIndicator::Descending => "descending",
        }
    }
}

/// Column header that sorts the table by its own column when clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortableHeader {
    pub column: SortColumn,
    pub label: &'static str,
}

pub static HEADERS: [SortableHeader; 6] = [
    SortableHeader { column: SortColumn::EnqueueTime, label: "Enqueue time" },
    SortableHeader { column: SortColumn::Id, label: "ID" },
    SortableHeader { column: SortColumn::Status, label: "Status" },
    SortableHeader { column: SortColumn::Function, label: "Function" },
    SortableHeader { column: SortColumn::StartTime, label: "Start Time" },
    SortableHeader { column: SortColumn::ExecutionDuration, label: "Duration" },
];

pub fn header_for(column: SortColumn) -> Option<&'static SortableHeader> {
    HEADERS.iter().find(|h| h.column == column)
}

impl SortableHeader {
    pub fn indicator(&self, sort_by: SortColumn, sort_order: SortOrder) -> SortIndicator {
        if sort_by != self.column {
            SortIndicator::Neutral
        } else if sort_order == SortOrder::Asc {
            SortIndicator::Ascending
        } else {
            SortIndicator::Descending
        }
    }

    /// The header's click handler. Direction and column bookkeeping belong
    /// to the store.
    pub fn click(&self, store: &TableJobsStore) {
        store.set_sort_by(self.column);
    }

    pub fn render(&self, sort_by: SortColumn, sort_order: SortOrder) -> String {
        let indicator = self.indicator(sort_by, sort_order);
        format!(
            r#"<th aria-sort="{}"><form method="post" action="/ui/sort/{}"><button><span>{}</span><span class="sort-icon" data-sort="{}">{}</span></button></form></th>"#,
            indicator.as_str(),
            self.column.as_str(),
            escape(self.label),
            indicator.as_str(),
            indicator.glyph(),
        )
    }
}
