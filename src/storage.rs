//! Durable client-side configuration storage.
//!
//! One JSON document at a well-known path under the platform config directory,
//! read once at startup and rewritten on every accepted edit and every backend
//! snapshot. Storage failures are never fatal: a missing or corrupt file reads
//! as "no saved configuration", and write failures are logged and dropped.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::protocol::TranslationConfig;

const STORAGE_DIR: &str = "transterm";
const STORAGE_FILE: &str = "config.json";

/// Delay before re-probing an unavailable config directory.
const STORAGE_RETRY_DELAY_MS: u64 = 100;
const STORAGE_RETRY_ATTEMPTS: u32 = 10;

/// Handle to the persisted configuration document.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Resolve the default storage location.
    ///
    /// The platform config directory can be briefly unavailable early in a
    /// session, so resolution retries on a fixed delay instead of failing.
    /// Returns `None` only once every attempt has been exhausted.
    pub fn open_default() -> Option<Self> {
        for attempt in 0..STORAGE_RETRY_ATTEMPTS {
            if let Some(base) = dirs::config_dir() {
                return Some(Self {
                    path: base.join(STORAGE_DIR).join(STORAGE_FILE),
                });
            }
            tracing::debug!(attempt, "config directory unavailable; retrying");
            thread::sleep(Duration::from_millis(STORAGE_RETRY_DELAY_MS));
        }
        tracing::warn!("config directory never became available; edits will not persist");
        None
    }

    /// Storage rooted at an explicit file path.
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved configuration, treating every failure as absence.
    pub fn load(&self) -> Option<TranslationConfig> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), %err, "no saved configuration");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "saved configuration unreadable; using defaults");
                None
            }
        }
    }

    /// Persist the configuration; failures are logged and dropped.
    pub fn save(&self, config: &TranslationConfig) {
        let Ok(json) = serde_json::to_string_pretty(config) else {
            tracing::warn!("configuration failed to serialize; not persisted");
            return;
        };
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), %err, "could not create config directory");
                return;
            }
        }
        if let Err(err) = fs::write(&self.path, json) {
            tracing::warn!(path = %self.path.display(), %err, "could not persist configuration");
        }
    }
}
