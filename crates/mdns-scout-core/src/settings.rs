//! Persisted search settings.
//!
//! Stores [`SearchDefaults`] as `settings.json` so the CLI keeps the user's
//! search parameters between invocations.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::config::SearchDefaults;
use crate::error::SettingsError;

const SETTINGS_FILE: &str = "settings.json";

/// Get the default settings directory for mdns-scout.
pub fn default_config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "mdns-scout", "mdns-scout")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// File-backed store for search defaults.
pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Store in the platform configuration directory.
    pub fn open_default() -> Result<Self, SettingsError> {
        default_config_dir()
            .map(Self::new)
            .ok_or(SettingsError::NoConfigDir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    /// Load saved settings, or the defaults if nothing was saved yet.
    pub async fn load(&self) -> Result<SearchDefaults, SettingsError> {
        let path = self.path();

        if !fs::try_exists(&path).await? {
            debug!(path = %path.display(), "no saved settings, using defaults");
            return Ok(SearchDefaults::default());
        }

        let content = fs::read_to_string(&path).await?;
        let settings: SearchDefaults = serde_json::from_str(&content)?;
        settings.validate()?;

        Ok(settings)
    }

    /// Validate and write `settings`.
    pub async fn save(&self, settings: &SearchDefaults) -> Result<(), SettingsError> {
        settings.validate()?;

        fs::create_dir_all(&self.dir).await?;
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(self.path(), content).await?;

        debug!(path = %self.path().display(), "settings saved");
        Ok(())
    }

    /// Forget saved settings and return the defaults.
    pub async fn reset(&self) -> Result<SearchDefaults, SettingsError> {
        let path = self.path();

        if fs::try_exists(&path).await? {
            fs::remove_file(&path).await?;
            debug!(path = %path.display(), "settings removed");
        }

        Ok(SearchDefaults::default())
    }
}
