//! Configuration module for SourceTrail.
//!
//! Loads run parameters from environment variables with sensible defaults.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::db::SameDayPolicy;

/// Run configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Path to the target registry JSON file (default: "targets.json")
    pub targets_path: String,
    /// Path to the persisted history window (default: "history.json")
    pub history_path: String,
    /// Path the rendered report is written to (default: "REPORT.md")
    pub report_path: String,
    /// Maximum number of daily snapshots kept (default: 30)
    pub max_days: usize,
    /// Consecutive failed days before a target is flagged (default: 3)
    pub warn_streak_threshold: u32,
    /// Per-request timeout (default: 10s)
    pub request_timeout: Duration,
    /// Maximum number of probes in flight (default: 10)
    pub concurrency: usize,
    /// Attempts per request, including the first one (default: 3)
    pub max_retry: u32,
    /// Fixed delay between attempts (default: 500ms)
    pub retry_delay: Duration,
    /// Whether the search capability check runs (default: true)
    pub search_enabled: bool,
    /// Keyword sent with the search check (default: "test")
    pub search_keyword: String,
    /// What to do when today already has a snapshot (default: replace)
    pub same_day: SameDayPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            targets_path: "targets.json".to_string(),
            history_path: "history.json".to_string(),
            report_path: "REPORT.md".to_string(),
            max_days: 30,
            warn_streak_threshold: 3,
            request_timeout: Duration::from_secs(10),
            concurrency: 10,
            max_retry: 3,
            retry_delay: Duration::from_millis(500),
            search_enabled: true,
            search_keyword: "test".to_string(),
            same_day: SameDayPolicy::Replace,
        }
    }
}

impl RunConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SOURCETRAIL_TARGETS_PATH`, `SOURCETRAIL_HISTORY_PATH`, `SOURCETRAIL_REPORT_PATH`
    /// - `SOURCETRAIL_MAX_DAYS`, `SOURCETRAIL_WARN_STREAK`
    /// - `SOURCETRAIL_TIMEOUT_MS`, `SOURCETRAIL_CONCURRENCY`
    /// - `SOURCETRAIL_MAX_RETRY`, `SOURCETRAIL_RETRY_DELAY_MS`
    /// - `SOURCETRAIL_SEARCH_ENABLED`, `SOURCETRAIL_SEARCH_KEYWORD`
    /// - `SOURCETRAIL_SAME_DAY` (`replace` or `append`)
    ///
    /// Values that fail to parse, and zero where zero makes no sense, keep the default.
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(path) = lookup("SOURCETRAIL_TARGETS_PATH") {
            cfg.targets_path = path;
        }
        if let Some(path) = lookup("SOURCETRAIL_HISTORY_PATH") {
            cfg.history_path = path;
        }
        if let Some(path) = lookup("SOURCETRAIL_REPORT_PATH") {
            cfg.report_path = path;
        }

        if let Some(days) = parse_positive::<usize>(&lookup, "SOURCETRAIL_MAX_DAYS") {
            cfg.max_days = days;
        }
        if let Some(threshold) = parse_positive::<u32>(&lookup, "SOURCETRAIL_WARN_STREAK") {
            cfg.warn_streak_threshold = threshold;
        }
        if let Some(ms) = parse_positive::<u64>(&lookup, "SOURCETRAIL_TIMEOUT_MS") {
            cfg.request_timeout = Duration::from_millis(ms);
        }
        if let Some(limit) = parse_positive::<usize>(&lookup, "SOURCETRAIL_CONCURRENCY") {
            cfg.concurrency = limit;
        }
        if let Some(attempts) = parse_positive::<u32>(&lookup, "SOURCETRAIL_MAX_RETRY") {
            cfg.max_retry = attempts;
        }
        // Zero delay is allowed here.
        if let Some(ms) = lookup("SOURCETRAIL_RETRY_DELAY_MS").and_then(|v| v.trim().parse::<u64>().ok()) {
            cfg.retry_delay = Duration::from_millis(ms);
        }

        if let Some(enabled) = lookup("SOURCETRAIL_SEARCH_ENABLED").and_then(|v| parse_bool(&v)) {
            cfg.search_enabled = enabled;
        }
        if let Some(keyword) = lookup("SOURCETRAIL_SEARCH_KEYWORD") {
            if !keyword.trim().is_empty() {
                cfg.search_keyword = keyword;
            }
        }
        if let Some(policy) = lookup("SOURCETRAIL_SAME_DAY").and_then(|v| v.parse::<SameDayPolicy>().ok()) {
            cfg.same_day = policy;
        }

        cfg
    }
}

fn parse_positive<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr + PartialOrd + Default,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .filter(|v| *v > T::default())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
