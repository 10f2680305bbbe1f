//! Compact recent-history strings.

use crate::db::HistoryWindow;

/// Number of most recent days shown in a trend.
pub const TREND_DAYS: usize = 7;

/// One day in a trend string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendMark {
    Success,
    Failure,
    NoData,
}

impl TrendMark {
    pub fn symbol(&self) -> &'static str {
        match self {
            TrendMark::Success => "✅",
            TrendMark::Failure => "❌",
            TrendMark::NoData => "-",
        }
    }
}

/// Marks for the last `TREND_DAYS` snapshots, oldest first.
pub fn trend_marks(history: &HistoryWindow, url: &str) -> Vec<TrendMark> {
    let snapshots = history.snapshots();
    let skip = snapshots.len().saturating_sub(TREND_DAYS);

    snapshots
        .iter()
        .skip(skip)
        .map(|s| match s.outcome_for(url) {
            Some(o) if o.reachable => TrendMark::Success,
            Some(_) => TrendMark::Failure,
            None => TrendMark::NoData,
        })
        .collect()
}

pub fn trend(history: &HistoryWindow, url: &str) -> String {
    trend_marks(history, url)
        .iter()
        .map(TrendMark::symbol)
        .collect()
}
