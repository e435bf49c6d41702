//! Persisted user preferences.
//!
//! Currently just the accent color. Persistence goes through the
//! injected [`SettingsStore`] seam; the file-backed implementation is
//! what shells use, tests substitute their own. No global state: the
//! embedding application owns the [`SettingsManager`] and decides
//! where the file lives.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use common::metadata::AccentColor;

/// User preferences, as stored on disk.
///
/// Missing fields deserialize to their defaults so old files keep
/// working as settings are added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub accent_color: AccentColor,
}

/// Errors loading or saving settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Injected persistence for [`Settings`].
pub trait SettingsStore: Send + Sync {
    /// Load stored settings. `Ok(None)` means nothing stored yet.
    fn load(&self) -> Result<Option<Settings>, SettingsError>;

    /// Persist the given settings.
    fn save(&self, settings: &Settings) -> Result<(), SettingsError>;
}

/// JSON file on disk.
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Result<Option<Settings>, SettingsError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(settings)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }
}

/// Owns the in-memory settings and keeps the store in sync.
pub struct SettingsManager {
    store: Box<dyn SettingsStore>,
    settings: Settings,
}

impl SettingsManager {
    /// Load settings from the store. A missing or unreadable store
    /// falls back to defaults so the app always starts.
    #[must_use]
    pub fn load(store: Box<dyn SettingsStore>) -> Self {
        let settings = match store.load() {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                debug!(target: "session.settings", "No stored settings, using defaults");
                Settings::default()
            }
            Err(e) => {
                warn!(
                    target: "session.settings",
                    error = %e,
                    "Failed to load settings, using defaults"
                );
                Settings::default()
            }
        };
        Self { store, settings }
    }

    #[must_use]
    pub fn settings(&self) -> Settings {
        self.settings
    }

    #[must_use]
    pub fn accent_color(&self) -> AccentColor {
        self.settings.accent_color
    }

    /// Change the accent color and persist it. Setting the current
    /// color is a no-op and skips the write.
    pub fn set_accent_color(&mut self, color: AccentColor) -> Result<(), SettingsError> {
        if self.settings.accent_color == color {
            return Ok(());
        }
        self.settings.accent_color = color;
        self.store.save(&self.settings)
    }
}

impl std::fmt::Debug for SettingsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsManager")
            .field("settings", &self.settings)
            .finish()
    }
}
