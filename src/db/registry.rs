//! Target registry loading.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::models::{Target, PLACEHOLDER_ID};

/// Registry error types. Any of these aborts the run.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to read registry: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse registry: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("registry contains no targets")]
    Empty,
    #[error("invalid target #{index}: {reason}")]
    Invalid { index: usize, reason: String },
}

/// A registry entry as written in the targets file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TargetEntry {
    name: String,
    base_url: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    enabled: Option<bool>,
}

/// Load targets from a JSON registry file.
pub fn load_targets<P: AsRef<Path>>(path: P) -> Result<Vec<Target>, RegistryError> {
    let content = std::fs::read_to_string(path)?;
    parse_targets(&content)
}

/// Parse and validate a JSON array of registry entries, keeping their order.
pub fn parse_targets(content: &str) -> Result<Vec<Target>, RegistryError> {
    let entries: Vec<TargetEntry> = serde_json::from_str(content)?;
    if entries.is_empty() {
        return Err(RegistryError::Empty);
    }

    let mut seen = HashSet::new();
    let mut targets = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let name = entry.name.trim().to_string();
        let endpoint_url = entry.base_url.trim().to_string();

        if name.is_empty() {
            return Err(RegistryError::Invalid {
                index,
                reason: "name is empty".to_string(),
            });
        }
        if endpoint_url.is_empty() {
            return Err(RegistryError::Invalid {
                index,
                reason: "baseUrl is empty".to_string(),
            });
        }
        if let Err(e) = reqwest::Url::parse(&request_url(&endpoint_url)) {
            return Err(RegistryError::Invalid {
                index,
                reason: format!("baseUrl {:?} is not a valid URL: {}", endpoint_url, e),
            });
        }

        if !seen.insert(endpoint_url.clone()) {
            tracing::warn!(
                "Registry: {} reuses endpoint {}; its results share one history",
                name,
                endpoint_url
            );
        }

        let reference_id = entry
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_ID.to_string());

        targets.push(Target {
            name,
            endpoint_url,
            reference_id,
            disabled: !entry.enabled.unwrap_or(true),
        });
    }

    Ok(targets)
}

/// URL actually requested for an endpoint; bare hosts default to plain HTTP.
pub fn request_url(address: &str) -> String {
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    }
}
