//! Aggregation of probe history into per-target status rows.

mod trend;

pub use trend::*;

use crate::config::RunConfig;
use crate::db::{DailySnapshot, HistoryWindow, SameDayPolicy, SearchStatus, Target};

/// Target status, declared in severity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    /// Failing for at least the warning threshold of consecutive days.
    WarnStreak,
    /// Unreachable (or not recorded) today.
    Down,
    Ok,
    /// Administratively disabled in the registry.
    Disabled,
}

impl Status {
    /// Sort rank; lower is more severe.
    pub fn rank(&self) -> u8 {
        match self {
            Status::WarnStreak => 0,
            Status::Down => 1,
            Status::Ok => 2,
            Status::Disabled => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::WarnStreak => "🚨 WARN",
            Status::Down => "❌ DOWN",
            Status::Ok => "✅ OK",
            Status::Disabled => "🚫 DISABLED",
        }
    }
}

/// Derived statistics for one target.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedStat {
    pub target: Target,
    pub status: Status,
    pub success_count: u32,
    pub failure_count: u32,
    /// Percentage of recorded days that succeeded, `None` with no records.
    pub success_rate: Option<f64>,
    pub trend: String,
    pub current_streak: u32,
    pub latest_search_status: SearchStatus,
}

impl AggregatedStat {
    /// Success rate rendered to one decimal place, or "-".
    pub fn success_rate_label(&self) -> String {
        match self.success_rate {
            Some(rate) => format!("{:.1}%", rate),
            None => "-".to_string(),
        }
    }
}

/// Number of targets per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub ok: usize,
    pub down: usize,
    pub warn: usize,
    pub disabled: usize,
}

impl StatusCounts {
    pub fn from_stats(stats: &[AggregatedStat]) -> Self {
        let mut counts = Self::default();
        for stat in stats {
            match stat.status {
                Status::Ok => counts.ok += 1,
                Status::Down => counts.down += 1,
                Status::WarnStreak => counts.warn += 1,
                Status::Disabled => counts.disabled += 1,
            }
        }
        counts
    }
}

/// Folds each run into the history window and derives per-target stats.
#[derive(Debug, Clone)]
pub struct Aggregator {
    warn_streak_threshold: u32,
    same_day: SameDayPolicy,
}

impl Aggregator {
    pub fn new(cfg: &RunConfig) -> Self {
        Self {
            warn_streak_threshold: cfg.warn_streak_threshold,
            same_day: cfg.same_day,
        }
    }

    /// Append today's snapshot to `history`, then compute stats for every
    /// target, most severe first. Targets with equal status keep their
    /// registry order.
    pub fn fold(
        &self,
        history: &mut HistoryWindow,
        today: DailySnapshot,
        targets: &[Target],
    ) -> Vec<AggregatedStat> {
        history.push(today, self.same_day);

        let mut stats: Vec<AggregatedStat> = targets
            .iter()
            .map(|target| self.stat_for(history, target))
            .collect();

        // sort_by_key is stable
        stats.sort_by_key(|s| s.status.rank());
        stats
    }

    fn stat_for(&self, history: &HistoryWindow, target: &Target) -> AggregatedStat {
        let url = target.endpoint_url.as_str();
        let (success_count, failure_count) = count_outcomes(history, url);
        let current_streak = current_streak(history, url);
        let today = history.latest().and_then(|s| s.outcome_for(url));

        let status = if target.disabled {
            Status::Disabled
        } else if current_streak >= self.warn_streak_threshold {
            Status::WarnStreak
        } else if today.map_or(true, |o| !o.reachable) {
            Status::Down
        } else {
            Status::Ok
        };

        AggregatedStat {
            target: target.clone(),
            status,
            success_count,
            failure_count,
            success_rate: success_rate(success_count, failure_count),
            trend: trend(history, url),
            current_streak,
            latest_search_status: today.map_or(SearchStatus::Failed, |o| o.search_status),
        }
    }
}

/// Days with a recorded success and a recorded failure for `url`.
pub fn count_outcomes(history: &HistoryWindow, url: &str) -> (u32, u32) {
    history
        .snapshots()
        .iter()
        .filter_map(|s| s.outcome_for(url))
        .fold((0, 0), |(ok, failed), o| {
            if o.reachable {
                (ok + 1, failed)
            } else {
                (ok, failed + 1)
            }
        })
}

pub fn success_rate(success: u32, failure: u32) -> Option<f64> {
    let total = success + failure;
    if total == 0 {
        None
    } else {
        Some(f64::from(success) * 100.0 / f64::from(total))
    }
}

/// Consecutive most recent days without a recorded success.
///
/// Days where the target has no outcome count toward the streak.
pub fn current_streak(history: &HistoryWindow, url: &str) -> u32 {
    let mut streak = 0;
    for snapshot in history.snapshots().iter().rev() {
        match snapshot.outcome_for(url) {
            Some(o) if o.reachable => break,
            _ => streak += 1,
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ProbeOutcome;
    use chrono::NaiveDate;

    const X: &str = "https://x.example/api";

    fn target(name: &str, url: &str) -> Target {
        Target {
            name: name.to_string(),
            endpoint_url: url.to_string(),
            ..Target::default()
        }
    }

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(u64::from(n))
    }

    fn outcome(url: &str, reachable: bool) -> ProbeOutcome {
        ProbeOutcome {
            endpoint_url: url.to_string(),
            reachable,
            search_status: if reachable { SearchStatus::Ok } else { SearchStatus::NotTested },
        }
    }

    /// History for a single target; `None` means no record that day.
    fn history_of(days: &[Option<bool>], max_days: usize) -> HistoryWindow {
        let mut window = HistoryWindow::new(max_days);
        for (i, d) in days.iter().enumerate() {
            let outcomes = d.map(|r| vec![outcome(X, r)]).unwrap_or_default();
            window.push(DailySnapshot::new(day(i as u32), outcomes), SameDayPolicy::Append);
        }
        window
    }

    fn aggregator(threshold: u32) -> Aggregator {
        Aggregator::new(&RunConfig {
            warn_streak_threshold: threshold,
            ..RunConfig::default()
        })
    }

    #[test]
    fn test_streak_resets_after_success() {
        let h = history_of(&[Some(false), Some(false), Some(false), Some(true)], 30);
        assert_eq!(current_streak(&h, X), 0);

        let h = history_of(&[Some(true), Some(false), Some(false), Some(false)], 30);
        assert_eq!(current_streak(&h, X), 3);
    }

    #[test]
    fn test_streak_counts_missing_days() {
        let h = history_of(&[Some(true), None, Some(false), None], 30);
        assert_eq!(current_streak(&h, X), 3);

        let h = history_of(&[None, None], 30);
        assert_eq!(current_streak(&h, X), 2);
    }

    #[test]
    fn test_counts_skip_missing_days() {
        let h = history_of(&[Some(true), None, Some(false), Some(true)], 30);
        assert_eq!(count_outcomes(&h, X), (2, 1));
        assert_eq!(count_outcomes(&h, "https://other.example"), (0, 0));
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(success_rate(0, 0), None);
        assert_eq!(success_rate(3, 0), Some(100.0));

        let stat = AggregatedStat {
            target: target("x", X),
            status: Status::Ok,
            success_count: 2,
            failure_count: 1,
            success_rate: success_rate(2, 1),
            trend: String::new(),
            current_streak: 0,
            latest_search_status: SearchStatus::Ok,
        };
        assert_eq!(stat.success_rate_label(), "66.7%");
        assert_eq!(
            AggregatedStat { success_rate: None, ..stat }.success_rate_label(),
            "-"
        );
    }

    #[test]
    fn test_fold_appends_and_classifies() {
        let targets = vec![
            target("healthy", "https://a.example"),
            target("flaky", "https://b.example"),
            Target {
                disabled: true,
                ..target("off", "https://c.example")
            },
            target("dead", "https://d.example"),
            target("new", "https://e.example"),
        ];

        let mut history = HistoryWindow::new(30);
        for i in 0..3 {
            history.push(
                DailySnapshot::new(
                    day(i),
                    vec![
                        outcome("https://a.example", true),
                        outcome("https://b.example", true),
                        ProbeOutcome::disabled("https://c.example"),
                        outcome("https://d.example", false),
                    ],
                ),
                SameDayPolicy::Append,
            );
        }

        let today = DailySnapshot::new(
            day(3),
            vec![
                outcome("https://a.example", true),
                outcome("https://b.example", false),
                ProbeOutcome::disabled("https://c.example"),
                outcome("https://d.example", false),
                outcome("https://e.example", true),
            ],
        );

        let stats = aggregator(3).fold(&mut history, today, &targets);
        assert_eq!(history.len(), 4);

        let names: Vec<_> = stats.iter().map(|s| s.target.name.as_str()).collect();
        assert_eq!(names, ["dead", "flaky", "healthy", "new", "off"]);

        let by_name = |n: &str| stats.iter().find(|s| s.target.name == n).unwrap();

        let dead = by_name("dead");
        assert_eq!(dead.status, Status::WarnStreak);
        assert_eq!(dead.current_streak, 4);
        assert_eq!(dead.success_rate_label(), "0.0%");

        let flaky = by_name("flaky");
        assert_eq!(flaky.status, Status::Down);
        assert_eq!(flaky.current_streak, 1);
        assert_eq!((flaky.success_count, flaky.failure_count), (3, 1));
        assert_eq!(flaky.trend, "✅✅✅❌");

        let new = by_name("new");
        assert_eq!(new.status, Status::Ok);
        assert_eq!(new.trend, "---✅");
        assert_eq!(new.success_rate, Some(100.0));

        let off = by_name("off");
        assert_eq!(off.status, Status::Disabled);
        assert_eq!(off.latest_search_status, SearchStatus::Disabled);

        for stat in &stats {
            assert!((stat.success_count + stat.failure_count) as usize <= history.len());
        }
    }

    #[test]
    fn test_missing_today_is_down_with_failed_search() {
        let targets = vec![target("x", X)];
        let mut history = history_of(&[Some(true)], 30);

        let stats = aggregator(3).fold(&mut history, DailySnapshot::new(day(1), vec![]), &targets);
        assert_eq!(stats[0].status, Status::Down);
        assert_eq!(stats[0].latest_search_status, SearchStatus::Failed);
        assert_eq!(stats[0].current_streak, 1);
    }

    #[test]
    fn test_disabled_outranks_streak() {
        let targets = vec![Target {
            disabled: true,
            ..target("x", X)
        }];
        let mut history = history_of(&[Some(false), Some(false), Some(false)], 30);

        let stats = aggregator(2).fold(
            &mut history,
            DailySnapshot::new(day(3), vec![ProbeOutcome::disabled(X)]),
            &targets,
        );
        assert_eq!(stats[0].status, Status::Disabled);
    }

    #[test]
    fn test_shared_endpoint_with_disabled_twin() {
        let targets = vec![
            Target {
                disabled: true,
                ..target("off", X)
            },
            target("on", X),
        ];
        let today = DailySnapshot::new(
            day(0),
            vec![
                ProbeOutcome::disabled(X),
                ProbeOutcome {
                    endpoint_url: X.to_string(),
                    reachable: true,
                    search_status: SearchStatus::Ok,
                },
            ],
        );

        let mut history = HistoryWindow::new(30);
        let stats = aggregator(3).fold(&mut history, today, &targets);

        let on = stats.iter().find(|s| s.target.name == "on").unwrap();
        assert_eq!(on.status, Status::Ok);
        assert_eq!(on.latest_search_status, SearchStatus::Ok);
        assert_eq!((on.success_count, on.failure_count), (1, 0));

        let off = stats.iter().find(|s| s.target.name == "off").unwrap();
        assert_eq!(off.status, Status::Disabled);
    }

    #[test]
    fn test_sort_is_stable_for_equal_status() {
        let targets: Vec<_> = (0..5)
            .map(|i| target(&format!("t{}", i), &format!("https://t{}.example", i)))
            .collect();
        let outcomes = targets
            .iter()
            .enumerate()
            .map(|(i, t)| outcome(&t.endpoint_url, i % 2 == 0))
            .collect();

        let mut history = HistoryWindow::new(30);
        let stats = aggregator(3).fold(&mut history, DailySnapshot::new(day(0), outcomes), &targets);
        let names: Vec<_> = stats.iter().map(|s| s.target.name.as_str()).collect();
        assert_eq!(names, ["t1", "t3", "t0", "t2", "t4"]);
    }

    #[test]
    fn test_fold_evicts_oldest_at_cap() {
        let targets = vec![target("x", X)];
        let mut history = history_of(&[Some(false), Some(true), Some(true)], 3);

        let stats = aggregator(3).fold(
            &mut history,
            DailySnapshot::new(day(3), vec![outcome(X, true)]),
            &targets,
        );
        assert_eq!(history.len(), 3);
        assert_eq!(history.snapshots().front().unwrap().date, day(1));
        assert_eq!((stats[0].success_count, stats[0].failure_count), (3, 0));
    }

    #[test]
    fn test_all_targets_failing_still_produces_table() {
        let targets: Vec<_> = (0..3)
            .map(|i| target(&format!("t{}", i), &format!("https://t{}.example", i)))
            .collect();
        let outcomes = targets.iter().map(|t| outcome(&t.endpoint_url, false)).collect();

        let mut history = HistoryWindow::new(30);
        let stats = aggregator(3).fold(&mut history, DailySnapshot::new(day(0), outcomes), &targets);
        assert_eq!(stats.len(), 3);
        assert!(stats.iter().all(|s| s.status == Status::Down));
    }

    #[test]
    fn test_status_counts() {
        let targets = vec![target("a", "https://a.example"), target("b", X)];
        let mut history = HistoryWindow::new(30);
        let stats = aggregator(3).fold(
            &mut history,
            DailySnapshot::new(day(0), vec![outcome("https://a.example", true)]),
            &targets,
        );
        let counts = StatusCounts::from_stats(&stats);
        assert_eq!(counts, StatusCounts { ok: 1, down: 1, warn: 0, disabled: 0 });
    }
}
