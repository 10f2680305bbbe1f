//! Markdown report rendering.

use std::path::Path;

use askama::Template;
use chrono::{DateTime, Local};
use thiserror::Error;

use crate::stats::{AggregatedStat, StatusCounts};

/// Report error types.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("template error: {0}")]
    Template(#[from] askama::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Metadata about the run shown at the top of the report.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub generated_at: DateTime<Local>,
    pub total_targets: usize,
    pub search_keyword: String,
    pub search_enabled: bool,
}

/// One table row, already formatted.
struct ReportRow {
    status: &'static str,
    name: String,
    id: String,
    search: &'static str,
    success: u32,
    failure: u32,
    rate: String,
    streak: u32,
    trend: String,
}

impl ReportRow {
    fn from_stat(stat: &AggregatedStat) -> Self {
        Self {
            status: stat.status.label(),
            name: escape_cell(&stat.target.name),
            id: escape_cell(&stat.target.reference_id),
            search: stat.latest_search_status.label(),
            success: stat.success_count,
            failure: stat.failure_count,
            rate: stat.success_rate_label(),
            streak: stat.current_streak,
            trend: stat.trend.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "report.md", escape = "none")]
struct ReportTemplate {
    generated_at: String,
    total_targets: usize,
    search_label: String,
    counts: StatusCounts,
    rows: Vec<ReportRow>,
}

/// Render the stats, in the order given, as a Markdown document.
pub fn render_report(summary: &RunSummary, stats: &[AggregatedStat]) -> Result<String, ReportError> {
    let search_label = if summary.search_enabled {
        format!("keyword `{}`", escape_cell(&summary.search_keyword))
    } else {
        "disabled".to_string()
    };

    let template = ReportTemplate {
        generated_at: summary.generated_at.format("%Y-%m-%d %H:%M:%S %Z").to_string(),
        total_targets: summary.total_targets,
        search_label,
        counts: StatusCounts::from_stats(stats),
        rows: stats.iter().map(ReportRow::from_stat).collect(),
    };

    Ok(template.render()?)
}

/// Write the rendered report, creating parent directories as needed.
pub fn write_report<P: AsRef<Path>>(path: P, contents: &str) -> Result<(), ReportError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents)?;
    Ok(())
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}
