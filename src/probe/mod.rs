//! Probe module for endpoint health checks.
//!
//! A probe checks reachability first and, when enabled, the search
//! capability of the same endpoint. Network errors never escape a probe;
//! they degrade to negative fields of the [`ProbeOutcome`].

mod http;
mod retry;

pub use http::*;
pub use retry::*;

use std::time::Duration;
use thiserror::Error;

use crate::config::RunConfig;
use crate::db::{ProbeOutcome, SearchStatus, Target};

/// Probe error types.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected status: {0}")]
    Status(u16),
    #[error("invalid payload: {0}")]
    Payload(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ProbeError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProbeError::Timeout(_) | ProbeError::Network(_) | ProbeError::Status(_)
        )
    }
}

/// Executes health checks against single targets.
///
/// Cloning is cheap; clones share the underlying HTTP connection pool.
#[derive(Debug, Clone)]
pub struct Prober {
    client: reqwest::Client,
    timeout: Duration,
    retry: RetryPolicy,
    search_keyword: Option<String>,
}

impl Prober {
    /// Build a prober from the run configuration.
    pub fn new(cfg: &RunConfig) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .user_agent(concat!("sourcetrail/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProbeError::Config(e.to_string()))?;

        let search_keyword = if cfg.search_enabled {
            Some(cfg.search_keyword.clone())
        } else {
            None
        };

        Ok(Self {
            client,
            timeout: cfg.request_timeout,
            retry: RetryPolicy::new(cfg.max_retry, cfg.retry_delay),
            search_keyword,
        })
    }

    /// Probe one target.
    ///
    /// Callers must not pass disabled targets; the scheduler substitutes
    /// their outcome without any network I/O.
    pub async fn probe(&self, target: &Target) -> ProbeOutcome {
        let url = &target.endpoint_url;
        let client = &self.client;
        let timeout = self.timeout;

        let reachable = match with_retry(&self.retry, &target.name, move || {
            check_reachable(client, url, timeout)
        })
        .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Probe: {} unreachable: {}", target.name, e);
                false
            }
        };

        let search_status = match (&self.search_keyword, reachable) {
            (Some(keyword), true) => self.search(target, keyword).await,
            _ => SearchStatus::NotTested,
        };

        tracing::debug!(
            "Probe: {} reachable={} search={:?}",
            target.name,
            reachable,
            search_status
        );

        ProbeOutcome {
            endpoint_url: url.clone(),
            reachable,
            search_status,
        }
    }

    async fn search(&self, target: &Target, keyword: &str) -> SearchStatus {
        let client = &self.client;
        let url = target.endpoint_url.as_str();
        let timeout = self.timeout;

        let payload = match with_retry(&self.retry, &target.name, move || {
            fetch_search(client, url, keyword, timeout)
        })
        .await
        {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Probe: search failed for {}: {}", target.name, e);
                return SearchStatus::Failed;
            }
        };

        match classify_search(payload) {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("Probe: {} returned {}", target.name, e);
                SearchStatus::Failed
            }
        }
    }
}
