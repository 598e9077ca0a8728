//! JSON storage document
//!
//! Holds the most recent notifications, the settings and the last-selected
//! filter. There is no schema version; unknown fields are ignored and
//! missing ones default.

use super::notification::Notification;
use super::settings::{NotificationFilter, Settings};
use crate::errors::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What gets written to disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub filter: NotificationFilter,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
}

/// File-backed home of the storage document
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, falling back to defaults on any failure
    pub fn load(&self) -> PersistedState {
        if !self.path.exists() {
            tracing::debug!("No storage document at {:?}, starting empty", self.path);
            return PersistedState::default();
        }

        match self.try_load() {
            Ok(state) => {
                tracing::info!(
                    notifications = state.notifications.len(),
                    "Loaded storage document from {:?}",
                    self.path
                );
                state
            }
            Err(e) => {
                tracing::warn!("Failed to load storage document: {}, using defaults", e);
                PersistedState::default()
            }
        }
    }

    fn try_load(&self) -> Result<PersistedState> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the document via a temp file and rename
    pub fn save(&self, state: &PersistedState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;

        tracing::debug!(
            notifications = state.notifications.len(),
            "Saved storage document to {:?}",
            self.path
        );
        Ok(())
    }
}
