/// Color family of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeColor {
    Green,
    Red,
    Gray,
    Blue,
}

impl BadgeColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeColor::Green => "green",
            BadgeColor::Red => "red",
            BadgeColor::Gray => "gray",
            BadgeColor::Blue => "blue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    /// Tooltip text.
    pub label: &'static str,
    pub color: BadgeColor,
    /// Text inside the badge.
    pub display_text: String,
}

/// Badge for a raw status string. Total: unknown statuses get a gray
/// "Unknown" badge showing the raw value.
pub fn format_status(status: &str, success: bool) -> StatusBadge {
    let (label, color) = match status {
        "complete" if success => ("Success", BadgeColor::Green),
        "complete" => ("Failed", BadgeColor::Red),
        "queued" => ("Queued", BadgeColor::Gray),
        "deferred" => ("Deferred", BadgeColor::Gray),
        "in_progress" => ("In Progress", BadgeColor::Blue),
        _ => ("Unknown", BadgeColor::Gray),
    };

    StatusBadge {
        label,
        color,
        display_text: status.to_string(),
    }
}
