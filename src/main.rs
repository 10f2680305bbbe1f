//! SourceTrail - Video Source Health Monitor
//!
//! Probes every registered video-source API once, folds the results into
//! the rolling daily history and renders a Markdown status report.

mod config;
mod db;
mod probe;
mod report;
mod scheduler;
mod stats;

use config::RunConfig;
use db::{DailySnapshot, HistoryStore, HistoryWindow, JsonFileStore};
use probe::Prober;
use report::RunSummary;
use stats::{AggregatedStat, Aggregator, StatusCounts};

use chrono::Local;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("sourcetrail=info".parse()?))
        .init();

    let cfg = RunConfig::load();
    run(&cfg).await?;

    Ok(())
}

/// Execute one probing run: load targets and history, probe, fold, persist
/// history and write the report.
async fn run(cfg: &RunConfig) -> Result<Vec<AggregatedStat>, Box<dyn std::error::Error + Send + Sync>> {
    tracing::info!("Loading targets from {}", cfg.targets_path);
    let targets = db::load_targets(&cfg.targets_path)?;
    tracing::info!("Loaded {} targets", targets.len());

    let store = JsonFileStore::new(&cfg.history_path);
    let mut history = HistoryWindow::from_snapshots(store.load(), cfg.max_days);
    if history.is_empty() {
        tracing::info!("No usable history at {}", store.path().display());
    } else {
        tracing::info!(
            "History has {} of {} days",
            history.len(),
            history.max_days()
        );
    }

    // Probe everything
    let started = Local::now();
    let prober = Prober::new(cfg)?;
    let outcomes = scheduler::run_all(&targets, cfg.concurrency, |target| {
        let prober = prober.clone();
        async move { prober.probe(&target).await }
    })
    .await;

    let today = DailySnapshot::new(started.date_naive(), outcomes);
    let stats = Aggregator::new(cfg).fold(&mut history, today, &targets);

    store.save(&history)?;
    tracing::info!(
        "Saved {} days of history to {}",
        history.len(),
        store.path().display()
    );

    let summary = RunSummary {
        generated_at: started,
        total_targets: targets.len(),
        search_keyword: cfg.search_keyword.clone(),
        search_enabled: cfg.search_enabled,
    };
    let document = report::render_report(&summary, &stats)?;
    report::write_report(&cfg.report_path, &document)?;

    let counts = StatusCounts::from_stats(&stats);
    tracing::info!(
        "Run complete: {} ok, {} down, {} warn, {} disabled; report written to {}",
        counts.ok,
        counts.down,
        counts.warn,
        counts.disabled,
        cfg.report_path
    );

    Ok(stats)
}
