//! Snapshot and persisted settings models.
//!
//! # Design
//! - `ConfigSnapshot` is the in-memory shape: four always-present strings.
//! - `AppSettings` is the on-disk shape where unset values are `None`.
//! - Conversions map `None` to `""` and back.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::defaults::default_server_url;
use crate::field::SettingField;

/// Point-in-time copy of every setting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    /// Path to the race database.
    pub database_path: String,
    /// Key presented to the sync server.
    pub api_key: String,
    /// Event the uploaded results belong to.
    pub event_key: String,
    /// Base URL of the sync server.
    pub server_url: String,
}

impl ConfigSnapshot {
    /// Value of a single field.
    #[must_use]
    pub fn value(&self, field: SettingField) -> &str {
        match field {
            SettingField::DatabasePath => &self.database_path,
            SettingField::ApiKey => &self.api_key,
            SettingField::EventKey => &self.event_key,
            SettingField::ServerUrl => &self.server_url,
        }
    }

    /// Mutable access to a single field.
    pub fn value_mut(&mut self, field: SettingField) -> &mut String {
        match field {
            SettingField::DatabasePath => &mut self.database_path,
            SettingField::ApiKey => &mut self.api_key,
            SettingField::EventKey => &mut self.event_key,
            SettingField::ServerUrl => &mut self.server_url,
        }
    }
}

/// Settings as written to `settings.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Key presented to the sync server, if configured.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Event key, if configured.
    #[serde(default)]
    pub event_key: Option<String>,
    /// Chosen race database, if any.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Base URL of the sync server.
    pub server_url: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            event_key: None,
            database_path: None,
            server_url: default_server_url().to_string(),
        }
    }
}

impl AppSettings {
    /// Database path rendered as a string, empty when unset.
    #[must_use]
    pub fn current_database_path(&self) -> String {
        self.database_path
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl From<AppSettings> for ConfigSnapshot {
    fn from(settings: AppSettings) -> Self {
        Self {
            database_path: settings.current_database_path(),
            api_key: settings.api_key.unwrap_or_default(),
            event_key: settings.event_key.unwrap_or_default(),
            server_url: settings.server_url,
        }
    }
}

impl From<&ConfigSnapshot> for AppSettings {
    fn from(snapshot: &ConfigSnapshot) -> Self {
        Self {
            api_key: non_empty(&snapshot.api_key),
            event_key: non_empty(&snapshot.event_key),
            database_path: non_empty(&snapshot.database_path).map(PathBuf::from),
            server_url: snapshot.server_url.clone(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
