//! Scheduler module for running probes with bounded concurrency.

use crate::db::{ProbeOutcome, Target};

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// A scheduled probe, in registry order.
enum Slot {
    /// Outcome known without probing.
    Ready(ProbeOutcome),
    Running {
        target_name: String,
        endpoint_url: String,
        handle: JoinHandle<ProbeOutcome>,
    },
}

/// Probe every target with at most `limit` probes in flight.
///
/// Targets are admitted in order; once `limit` probes are running, the
/// next one waits until any of them finishes. Disabled targets never reach
/// `probe` and get a disabled outcome instead. The returned outcome at
/// index `i` belongs to `targets[i]`.
pub async fn run_all<F, Fut>(targets: &[Target], limit: usize, probe: F) -> Vec<ProbeOutcome>
where
    F: Fn(Target) -> Fut,
    Fut: Future<Output = ProbeOutcome> + Send + 'static,
{
    let limit = limit.max(1);
    let semaphore = Arc::new(Semaphore::new(limit));
    let mut slots = Vec::with_capacity(targets.len());

    tracing::info!(
        "Scheduler: probing {} targets with concurrency {}",
        targets.len(),
        limit
    );

    for target in targets {
        if target.disabled {
            tracing::debug!("Scheduler: skipping disabled target {}", target.name);
            slots.push(Slot::Ready(ProbeOutcome::disabled(&target.endpoint_url)));
            continue;
        }

        let permit = match semaphore.clone().acquire_owned().await {
            Ok(p) => p,
            Err(e) => {
                // Only happens if the semaphore is closed, which we never do.
                tracing::error!("Scheduler: cannot admit {}: {}", target.name, e);
                slots.push(Slot::Ready(ProbeOutcome::failed(&target.endpoint_url)));
                continue;
            }
        };

        let fut = probe(target.clone());
        let handle = tokio::spawn(async move {
            let _permit = permit; // Hold permit until done
            fut.await
        });

        slots.push(Slot::Running {
            target_name: target.name.clone(),
            endpoint_url: target.endpoint_url.clone(),
            handle,
        });
    }

    let mut outcomes = Vec::with_capacity(slots.len());
    for slot in slots {
        let outcome = match slot {
            Slot::Ready(outcome) => outcome,
            Slot::Running {
                target_name,
                endpoint_url,
                handle,
            } => match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Scheduler: probe task for {} failed: {}", target_name, e);
                    ProbeOutcome::failed(&endpoint_url)
                }
            },
        };
        outcomes.push(outcome);
    }

    outcomes
}
