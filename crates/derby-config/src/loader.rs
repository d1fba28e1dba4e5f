//! `settings.json` persistence.
//!
//! # Design
//! - A missing file is surfaced as `ConfigError::NotFound` so callers can
//!   start from defaults without treating it as a failure.
//! - A file that fails to parse falls back to defaults with a warning; it is
//!   overwritten on the next save.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use crate::defaults::SETTINGS_FILE_NAME;
use crate::error::{ConfigError, ConfigResult};
use crate::model::AppSettings;

/// Persistence backend for [`AppSettings`].
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Read the stored settings.
    async fn load(&self) -> ConfigResult<AppSettings>;
    /// Replace the stored settings.
    async fn save(&self, settings: &AppSettings) -> ConfigResult<()>;
}

/// JSON file holding the persisted settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    /// Use an explicit file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use `settings.json` inside `dir`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(SETTINGS_FILE_NAME))
    }

    /// Location of the settings file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsRepository for SettingsFile {
    #[instrument(name = "settings_file.load", skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> ConfigResult<AppSettings> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("no settings file found");
                return Err(ConfigError::NotFound {
                    path: self.path.clone(),
                });
            }
            Err(err) => return Err(ConfigError::io("settings.read", self.path.clone(), err)),
        };

        match serde_json::from_str::<AppSettings>(&contents) {
            Ok(settings) => {
                debug!("settings file parsed");
                Ok(settings)
            }
            Err(err) => {
                warn!(error = %err, "settings file unreadable; using defaults");
                Ok(AppSettings::default())
            }
        }
    }

    #[instrument(name = "settings_file.save", skip(self, settings), fields(path = %self.path.display()))]
    async fn save(&self, settings: &AppSettings) -> ConfigResult<()> {
        let contents = serde_json::to_string_pretty(settings)
            .map_err(|source| ConfigError::Serialize { source })?;

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| ConfigError::io("settings.create_dir", parent.to_path_buf(), err))?;
        }

        fs::write(&self.path, contents)
            .await
            .map_err(|err| ConfigError::io("settings.write", self.path.clone(), err))?;
        info!("settings saved");
        Ok(())
    }
}
