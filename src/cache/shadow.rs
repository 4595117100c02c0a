//! Advisory on-disk copy of the view cache

use super::Provenance;
use crate::store::Sample;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Contents of the shadow slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowEntry {
    pub provenance: Provenance,
    pub samples: Vec<Sample>,
}

/// Single key-value slot backed by a JSON file.
///
/// A slot without a path is disabled: loads return nothing and saves are
/// dropped. Failures are logged and never surfaced.
#[derive(Debug, Clone, Default)]
pub struct ShadowSlot {
    path: Option<PathBuf>,
}

impl ShadowSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read the slot, if present and readable
    pub async fn load(&self) -> Option<ShadowEntry> {
        let path = self.path.as_ref()?;

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "Failed to read shadow slot");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "Ignoring malformed shadow slot");
                None
            }
        }
    }

    /// Overwrite the slot
    pub async fn save(&self, entry: &ShadowEntry) {
        let Some(path) = self.path.as_ref() else {
            return;
        };

        let json = match serde_json::to_vec(entry) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode shadow slot");
                return;
            }
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = tokio::fs::create_dir_all(parent).await {
                    tracing::warn!(path = ?parent, error = %e, "Failed to create shadow directory");
                    return;
                }
            }
        }

        if let Err(e) = tokio::fs::write(path, json).await {
            tracing::warn!(path = ?path, error = %e, "Failed to write shadow slot");
        }
    }
}
