//! Startup wiring: logging, persisted settings, and the settings service.

use std::path::PathBuf;
use std::sync::Arc;

use derby_config::defaults::default_server_url;
use derby_config::{
    AppSettings, ConfigError, ConfigSnapshot, SettingsFile, SettingsRepository, SettingsStore,
};
use derby_events::EventBus;
use derby_telemetry::LoggingConfig;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::service::SettingsService;

/// Inputs needed to start the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding `settings.json`.
    pub settings_dir: PathBuf,
    /// Sync server forced into the settings on every start.
    pub server_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings_dir: PathBuf::from("."),
            server_url: default_server_url().to_string(),
        }
    }
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed.
pub fn init_telemetry(logging: &LoggingConfig<'_>) -> AppResult<()> {
    derby_telemetry::init_logging(logging).map_err(|err| AppError::telemetry("telemetry.init", err))
}

/// Read persisted settings, falling back to defaults when none are stored,
/// and apply the configured server URL.
///
/// # Errors
///
/// Returns an error if the settings exist but cannot be read.
pub async fn load_snapshot(
    repository: &dyn SettingsRepository,
    server_url: &str,
) -> AppResult<ConfigSnapshot> {
    let settings = match repository.load().await {
        Ok(settings) => settings,
        Err(ConfigError::NotFound { path }) => {
            info!(path = %path.display(), "starting with default settings");
            AppSettings::default()
        }
        Err(err) => return Err(AppError::config("settings.load", err)),
    };

    let mut snapshot = ConfigSnapshot::from(settings);
    snapshot.server_url = server_url.to_string();
    Ok(snapshot)
}

/// Build the settings service for `config` using its settings file.
///
/// # Errors
///
/// Returns an error if the stored settings cannot be read.
pub async fn build_service(config: &AppConfig) -> AppResult<SettingsService> {
    let repository: Arc<dyn SettingsRepository> =
        Arc::new(SettingsFile::in_dir(&config.settings_dir));
    build_service_with(config, repository).await
}

/// Build the settings service with an injected persistence backend.
///
/// # Errors
///
/// Returns an error if the stored settings cannot be read.
pub async fn build_service_with(
    config: &AppConfig,
    repository: Arc<dyn SettingsRepository>,
) -> AppResult<SettingsService> {
    let snapshot = load_snapshot(repository.as_ref(), &config.server_url).await?;
    info!(
        settings_dir = %config.settings_dir.display(),
        server_url = %snapshot.server_url,
        "settings loaded"
    );
    let store = Arc::new(SettingsStore::from_snapshot(snapshot));
    Ok(SettingsService::new(store, repository, EventBus::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use derby_config::SettingField;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_settings_start_from_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig {
            settings_dir: dir.path().to_path_buf(),
            server_url: "https://derby.test".into(),
        };

        let service = build_service(&config).await.unwrap();

        let store = service.store();
        assert_eq!(store.get(SettingField::DatabasePath), "");
        assert_eq!(store.get(SettingField::ApiKey), "");
        assert_eq!(store.get(SettingField::ServerUrl), "https://derby.test");
    }

    #[tokio::test]
    async fn stored_server_url_is_replaced() {
        let dir = TempDir::new().unwrap();
        let file = SettingsFile::in_dir(dir.path());
        file.save(&AppSettings {
            api_key: Some("key".into()),
            event_key: Some("demo".into()),
            database_path: None,
            server_url: "http://stale.example".into(),
        })
        .await
        .unwrap();

        let snapshot = load_snapshot(&file, "https://derby-live.fly.dev")
            .await
            .unwrap();

        assert_eq!(snapshot.api_key, "key");
        assert_eq!(snapshot.event_key, "demo");
        assert_eq!(snapshot.server_url, "https://derby-live.fly.dev");
    }

    #[tokio::test]
    async fn unreadable_settings_are_an_error() {
        let dir = TempDir::new().unwrap();
        let file = SettingsFile::new(dir.path());
        let err = load_snapshot(&file, "http://localhost:4000")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Config {
                operation: "settings.load",
                ..
            }
        ));
    }

    #[test]
    fn default_config_uses_build_server_url() {
        let config = AppConfig::default();
        assert_eq!(config.server_url, default_server_url());
        assert_eq!(config.settings_dir, PathBuf::from("."));
    }
}
