//! Data model types shared by probing, history and aggregation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::str::FromStr;

/// A monitored video-source endpoint.
///
/// `endpoint_url` is the identity key used to match outcomes across days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub endpoint_url: String,
    pub reference_id: String,
    pub disabled: bool,
}

impl Default for Target {
    fn default() -> Self {
        Self {
            name: String::new(),
            endpoint_url: String::new(),
            reference_id: PLACEHOLDER_ID.to_string(),
            disabled: false,
        }
    }
}

/// Marker used when the registry gives no reference id.
pub const PLACEHOLDER_ID: &str = "-";

/// Result of the search capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchStatus {
    Ok,
    NoResults,
    Failed,
    Disabled,
    /// Also absorbs values this version does not know.
    #[default]
    #[serde(other)]
    NotTested,
}

impl SearchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SearchStatus::Ok => "✅",
            SearchStatus::NoResults => "⚠️ no results",
            SearchStatus::Failed => "❌",
            SearchStatus::Disabled => "🚫",
            SearchStatus::NotTested => "-",
        }
    }
}

/// The result of checking one target once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    #[serde(rename = "api")]
    pub endpoint_url: String,
    #[serde(rename = "success")]
    pub reachable: bool,
    #[serde(rename = "searchStatus", default)]
    pub search_status: SearchStatus,
}

impl ProbeOutcome {
    /// Outcome substituted for an administratively disabled target.
    pub fn disabled(endpoint_url: &str) -> Self {
        Self {
            endpoint_url: endpoint_url.to_string(),
            reachable: false,
            search_status: SearchStatus::Disabled,
        }
    }

    /// Outcome used when a probe could not produce a result at all.
    pub fn failed(endpoint_url: &str) -> Self {
        Self {
            endpoint_url: endpoint_url.to_string(),
            reachable: false,
            search_status: SearchStatus::Failed,
        }
    }
}

/// All probe outcomes of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    #[serde(rename = "results", default)]
    pub outcomes: Vec<ProbeOutcome>,
}

impl DailySnapshot {
    pub fn new(date: NaiveDate, outcomes: Vec<ProbeOutcome>) -> Self {
        Self { date, outcomes }
    }

    /// Outcome recorded for the given endpoint, if any.
    ///
    /// When several targets share the endpoint, the first probed outcome
    /// wins over disabled stand-ins.
    pub fn outcome_for(&self, endpoint_url: &str) -> Option<&ProbeOutcome> {
        let mut matching = self
            .outcomes
            .iter()
            .filter(|o| o.endpoint_url == endpoint_url);
        let first = matching.next()?;
        if first.search_status != SearchStatus::Disabled {
            return Some(first);
        }
        matching
            .find(|o| o.search_status != SearchStatus::Disabled)
            .or(Some(first))
    }
}

/// How a snapshot dated the same day as the newest entry is folded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameDayPolicy {
    /// Overwrite the newest snapshot.
    Replace,
    /// Keep both snapshots.
    Append,
}

impl FromStr for SameDayPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(SameDayPolicy::Replace),
            "append" => Ok(SameDayPolicy::Append),
            other => Err(format!("unknown same-day policy: {}", other)),
        }
    }
}

/// Rolling sequence of daily snapshots, oldest first, capped at `max_days`.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    snapshots: VecDeque<DailySnapshot>,
    max_days: usize,
}

impl HistoryWindow {
    pub fn new(max_days: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            max_days: max_days.max(1),
        }
    }

    /// Build a window from loaded snapshots, dropping the oldest beyond the cap.
    pub fn from_snapshots(snapshots: Vec<DailySnapshot>, max_days: usize) -> Self {
        let mut window = Self::new(max_days);
        window.snapshots = snapshots.into();
        window.enforce_cap();
        window
    }

    /// Fold a new snapshot in, evicting the oldest entries to respect the cap.
    pub fn push(&mut self, snapshot: DailySnapshot, policy: SameDayPolicy) {
        let same_day = self
            .snapshots
            .back()
            .is_some_and(|last| last.date == snapshot.date);

        if same_day && policy == SameDayPolicy::Replace {
            self.snapshots.pop_back();
        }

        self.snapshots.push_back(snapshot);
        self.enforce_cap();
    }

    fn enforce_cap(&mut self) {
        while self.snapshots.len() > self.max_days {
            self.snapshots.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn max_days(&self) -> usize {
        self.max_days
    }

    /// Most recent snapshot.
    pub fn latest(&self) -> Option<&DailySnapshot> {
        self.snapshots.back()
    }

    pub fn snapshots(&self) -> &VecDeque<DailySnapshot> {
        &self.snapshots
    }
}
