use crate::jobs::query::MAX_LIMIT;

// Clone: cheap to duplicate when a task needs its own copy

/// Runtime configuration, read from the environment (and `.env` if present).
#[derive(Clone, Debug)]

// One typed struct instead of raw env strings spread over main and the CLI.
// Every setting reads `JOBSBOARD_<NAME>` first and falls back to `<NAME>`.
pub struct Config {
    /// `None` runs the dashboard on an in-memory job source.
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub page_size: usize,
    pub max_jobs: i64,
    /// 0 disables background polling.
    pub poll_interval_secs: u64,
    pub migrate_on_startup: bool,
    /// Demo jobs generated for the in-memory source.
    pub seed_demo_jobs: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // a missing .env file is normal in production
        dotenvy::dotenv().ok();

        // no URL at all is not an error: the dashboard then serves demo data
        // from memory
        let database_url = env_or_fallback("JOBSBOARD_DATABASE_URL", "DATABASE_URL");

        let bind_addr = env_or_fallback("JOBSBOARD_BIND_ADDR", "BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string());
        // parse once here so a typo fails at startup, not at bind time
        bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|e| anyhow::anyhow!("invalid bind address {bind_addr:?}: {e}"))?;

        // a page never asks the listing query for more than it accepts
        let page_size = env_parse::<usize>("JOBSBOARD_PAGE_SIZE", "PAGE_SIZE")?
            .unwrap_or(50)
            .clamp(1, MAX_LIMIT as usize);

        // upper bound on rows pulled from the source per refresh
        let max_jobs = env_parse::<i64>("JOBSBOARD_MAX_JOBS", "MAX_JOBS")?
            .unwrap_or(50_000)
            .max(1);

        let poll_interval_secs =
            env_parse::<u64>("JOBSBOARD_POLL_INTERVAL_SECS", "POLL_INTERVAL_SECS")?.unwrap_or(5);

        let migrate_on_startup = env_bool("JOBSBOARD_MIGRATE_ON_STARTUP").unwrap_or(false);

        let seed_demo_jobs =
            env_parse::<usize>("JOBSBOARD_SEED_DEMO_JOBS", "SEED_DEMO_JOBS")?.unwrap_or(0);

        Ok(Self {
            database_url,
            bind_addr,
            page_size,
            max_jobs,
            poll_interval_secs,
            migrate_on_startup,
            seed_demo_jobs,
        })
    }
}

// Blank values count as unset, so `FOO=` in a .env file does not shadow the
// fallback name.
fn env_or_fallback(primary: &str, fallback: &str) -> Option<String> {
    std::env::var(primary)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| std::env::var(fallback).ok().filter(|s| !s.trim().is_empty()))
}

// Unlike the plain lookups, a value that is present but unparsable is an
// error rather than a silent default.
fn env_parse<T>(primary: &str, fallback: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_or_fallback(primary, fallback)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("{primary}={raw:?} is invalid: {e}"))
        })
        .transpose()
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 14] = [
        "JOBSBOARD_DATABASE_URL",
        "DATABASE_URL",
        "JOBSBOARD_BIND_ADDR",
        "BIND_ADDR",
        "JOBSBOARD_PAGE_SIZE",
        "PAGE_SIZE",
        "JOBSBOARD_MAX_JOBS",
        "MAX_JOBS",
        "JOBSBOARD_POLL_INTERVAL_SECS",
        "POLL_INTERVAL_SECS",
        "JOBSBOARD_MIGRATE_ON_STARTUP",
        "JOBSBOARD_SEED_DEMO_JOBS",
        "SEED_DEMO_JOBS",
        "RUST_LOG_FORMAT",
    ];

    fn clear() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn defaults_without_env() {
        clear();
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.page_size, 50);
        assert_eq!(cfg.max_jobs, 50_000);
        assert_eq!(cfg.poll_interval_secs, 5);
        assert!(!cfg.migrate_on_startup);
    }

    #[test]
    #[serial]
    fn prefixed_wins_and_blank_falls_back() {
        clear();
        std::env::set_var("JOBSBOARD_PAGE_SIZE", "20");
        std::env::set_var("PAGE_SIZE", "30");
        std::env::set_var("JOBSBOARD_DATABASE_URL", "  ");
        std::env::set_var("DATABASE_URL", "postgres://localhost/jobs");
        std::env::set_var("JOBSBOARD_MIGRATE_ON_STARTUP", "yes");

        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.page_size, 20);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/jobs"));
        assert!(cfg.migrate_on_startup);
        clear();
    }

    #[test]
    #[serial]
    fn page_size_is_clamped_and_garbage_rejected() {
        clear();
        std::env::set_var("PAGE_SIZE", "9000");
        assert_eq!(Config::from_env().unwrap().page_size, 500);

        std::env::set_var("PAGE_SIZE", "lots");
        assert!(Config::from_env().is_err());

        std::env::remove_var("PAGE_SIZE");
        std::env::set_var("BIND_ADDR", "nowhere");
        assert!(Config::from_env().is_err());
        clear();
    }
}
