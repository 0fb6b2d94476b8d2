use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. JSON lines when `RUST_LOG_FORMAT=json`,
/// human-readable otherwise. `RUST_LOG` sets the filter; without it only
/// `info` and above are logged.
pub fn init_tracing() {
    let use_json = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    let filter = filter_from(&std::env::var("RUST_LOG").unwrap_or_default());

    let result = if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().flatten_event(true).with_current_span(true))
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

// The `info` default only applies when `directives` names nothing.
fn filter_from(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .parse_lossy(directives)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn bare_level_overrides_the_default() {
        assert_eq!(filter_from("debug").max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(filter_from("warn").max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn empty_filter_falls_back_to_info() {
        assert_eq!(filter_from("").max_level_hint(), Some(LevelFilter::INFO));
    }
}
