//! History store backed by a standalone JSON file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::models::*;

/// Store error types.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persistence for the history window.
pub trait HistoryStore {
    /// Load persisted snapshots, oldest first.
    ///
    /// Never fails: missing or unreadable history is treated as empty.
    fn load(&self) -> Vec<DailySnapshot>;

    /// Persist the window as it stands after this run.
    fn save(&self, history: &HistoryWindow) -> Result<(), StoreError>;
}

/// History persisted as a JSON array of daily snapshots.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> Vec<DailySnapshot> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("No history at {}, starting fresh", self.path.display());
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!("Failed to read history {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        if content.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Vec<DailySnapshot>>(&content) {
            Ok(snapshots) => snapshots,
            Err(e) => {
                tracing::warn!(
                    "History {} is malformed, starting fresh: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn save(&self, history: &HistoryWindow) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(history.snapshots())?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
