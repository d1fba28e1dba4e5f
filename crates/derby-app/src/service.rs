//! Settings commands invoked by the client interface.
//!
//! # Design
//! - The service owns the shared store, a persistence backend, and the event
//!   bus; commands mutate the store first and persist afterwards.
//! - Store changes are forwarded to the bus as `SettingChanged` events naming
//!   the field only.
//! - `start_sync` validates the settings every time; the running flag only
//!   decides whether `SyncStarted` / `SyncStopped` are announced.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use derby_config::{
    AppSettings, SettingField, SettingsRepository, SettingsStore, Subscription, SyncTarget,
};
use derby_events::{Event, EventBus};
use tracing::{debug, info, instrument, warn};

use crate::error::{AppError, AppResult};

/// Settings command handlers backed by a shared store.
pub struct SettingsService {
    store: Arc<SettingsStore>,
    repository: Arc<dyn SettingsRepository>,
    events: EventBus,
    running: AtomicBool,
    forwarder: Option<Subscription>,
}

impl SettingsService {
    /// Wire the service and start forwarding store changes to `events`.
    #[must_use]
    pub fn new(
        store: Arc<SettingsStore>,
        repository: Arc<dyn SettingsRepository>,
        events: EventBus,
    ) -> Self {
        let forwarder = Some(forward_changes(&store, events.clone()));
        Self {
            store,
            repository,
            events,
            running: AtomicBool::new(false),
            forwarder,
        }
    }

    /// Shared store the service operates on.
    #[must_use]
    pub const fn store(&self) -> &Arc<SettingsStore> {
        &self.store
    }

    /// Bus receiving client notifications.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Current settings in their persisted shape.
    #[must_use]
    pub fn fetch_app_settings(&self) -> AppSettings {
        AppSettings::from(&self.store.snapshot())
    }

    /// Currently chosen database path, empty when none.
    #[must_use]
    pub fn fetch_database_path(&self) -> String {
        self.store.get(SettingField::DatabasePath)
    }

    /// Store the API and event keys, then persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be written.
    #[instrument(name = "settings.save_settings", skip(self, api_key))]
    pub async fn save_settings(&self, api_key: String, event_key: String) -> AppResult<()> {
        self.store.set(SettingField::ApiKey, api_key);
        self.store.set(SettingField::EventKey, event_key);
        self.persist().await
    }

    /// Select the race database.
    ///
    /// `Some(path)` is applied only when the path exists; `None` clears the
    /// selection. The resulting path is persisted, announced as
    /// `DatabaseChosen`, and returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be written.
    #[instrument(name = "settings.choose_database", skip(self))]
    pub async fn choose_database(&self, path: Option<PathBuf>) -> AppResult<String> {
        match path {
            Some(path) if path.exists() => {
                self.store
                    .set(SettingField::DatabasePath, path.to_string_lossy());
            }
            Some(path) => {
                warn!(path = %path.display(), "chosen database does not exist; keeping current");
            }
            None => self.store.set(SettingField::DatabasePath, String::new()),
        }

        let database_path = self.fetch_database_path();
        self.persist().await?;
        let _ = self.events.publish(Event::DatabaseChosen {
            database_path: database_path.clone(),
        });
        Ok(database_path)
    }

    /// Validate that the current settings can drive a sync run.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotReady`] and publishes `SyncError` when a
    /// precondition fails.
    pub fn check_sync_ready(&self) -> AppResult<SyncTarget> {
        SyncTarget::try_from_snapshot(&self.store.snapshot()).map_err(|source| {
            warn!(reason = %source, "sync precondition failed");
            let _ = self.events.publish(Event::SyncError {
                message: source.to_string(),
            });
            AppError::NotReady { source }
        })
    }

    /// Replace a single setting, then persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be written.
    #[instrument(name = "settings.set_field", skip(self, value))]
    pub async fn set_field(&self, field: SettingField, value: String) -> AppResult<()> {
        self.store.set(field, value);
        self.persist().await
    }

    /// Start syncing to the configured server.
    ///
    /// Starting while already running is a no-op apart from the readiness
    /// check.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotReady`] and publishes `SyncError` when a
    /// precondition fails.
    pub fn start_sync(&self) -> AppResult<SyncTarget> {
        let target = self.check_sync_ready()?;
        if self.running.swap(true, Ordering::AcqRel) {
            debug!("sync already running");
        } else {
            info!(upload_url = %target.upload_url(), "sync started");
            let _ = self.events.publish(Event::SyncStarted);
        }
        Ok(target)
    }

    /// Stop syncing. Returns whether a sync was running.
    #[must_use]
    pub fn stop_sync(&self) -> bool {
        let was_running = self.running.swap(false, Ordering::AcqRel);
        if was_running {
            info!("sync stopped");
            let _ = self.events.publish(Event::SyncStopped);
        }
        was_running
    }

    /// Whether a sync is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    async fn persist(&self) -> AppResult<()> {
        let settings = AppSettings::from(&self.store.snapshot());
        self.repository
            .save(&settings)
            .await
            .map_err(|err| AppError::config("settings.save", err))?;
        info!("settings persisted");
        Ok(())
    }
}

impl Drop for SettingsService {
    fn drop(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.unsubscribe();
        }
    }
}

fn forward_changes(store: &SettingsStore, events: EventBus) -> Subscription {
    // The initial callback per field reports existing values, not changes.
    let primed = Arc::new(AtomicBool::new(false));
    let armed = Arc::clone(&primed);
    let subscription = store.subscribe_all(move |field, _| {
        if armed.load(Ordering::Acquire) {
            let _ = events.publish(Event::SettingChanged {
                field: field.as_str().to_string(),
            });
        }
    });
    primed.store(true, Ordering::Release);
    subscription
}

#[cfg(test)]
mod tests {
    use super::*;
    use derby_config::SettingsFile;
    use tempfile::{NamedTempFile, TempDir};

    fn service_in(dir: &TempDir) -> SettingsService {
        SettingsService::new(
            Arc::new(SettingsStore::new()),
            Arc::new(SettingsFile::in_dir(dir.path())),
            EventBus::new(),
        )
    }

    #[tokio::test]
    async fn save_settings_updates_store_and_file() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir);

        service
            .save_settings("key".into(), "demo".into())
            .await
            .unwrap();

        let settings = service.fetch_app_settings();
        assert_eq!(settings.api_key.as_deref(), Some("key"));
        assert_eq!(settings.event_key.as_deref(), Some("demo"));
        let stored = SettingsFile::in_dir(dir.path()).load().await.unwrap();
        assert_eq!(stored, settings);
    }

    #[tokio::test]
    async fn choose_existing_database_is_applied_and_announced() {
        let dir = TempDir::new().unwrap();
        let db = NamedTempFile::new().unwrap();
        let service = service_in(&dir);
        let mut stream = service.events().subscribe(Some(0));

        let chosen = service
            .choose_database(Some(db.path().to_path_buf()))
            .await
            .unwrap();

        assert_eq!(chosen, db.path().to_string_lossy());
        assert_eq!(service.fetch_database_path(), chosen);
        let changed = stream.next().await.unwrap();
        assert_eq!(
            changed.event,
            Event::SettingChanged {
                field: "databasePath".into()
            }
        );
        let announced = stream.next().await.unwrap();
        assert_eq!(
            announced.event,
            Event::DatabaseChosen {
                database_path: chosen
            }
        );
    }

    #[tokio::test]
    async fn choose_missing_database_keeps_current_selection() {
        let dir = TempDir::new().unwrap();
        let db = NamedTempFile::new().unwrap();
        let service = service_in(&dir);
        let current = service
            .choose_database(Some(db.path().to_path_buf()))
            .await
            .unwrap();

        let chosen = service
            .choose_database(Some(dir.path().join("missing.sqlite")))
            .await
            .unwrap();

        assert_eq!(chosen, current);
    }

    #[tokio::test]
    async fn choose_none_clears_selection() {
        let dir = TempDir::new().unwrap();
        let db = NamedTempFile::new().unwrap();
        let service = service_in(&dir);
        service
            .choose_database(Some(db.path().to_path_buf()))
            .await
            .unwrap();

        let chosen = service.choose_database(None).await.unwrap();

        assert_eq!(chosen, "");
        let stored = SettingsFile::in_dir(dir.path()).load().await.unwrap();
        assert_eq!(stored.database_path, None);
    }

    #[test]
    fn check_sync_ready_publishes_sync_error() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir);

        let err = service.check_sync_ready().unwrap_err();

        assert!(matches!(
            err,
            AppError::NotReady {
                source: derby_config::SyncReadinessError::MissingDatabasePath
            }
        ));
        assert_eq!(service.events().last_event_id(), Some(1));
    }

    #[tokio::test]
    async fn set_field_updates_store_and_file() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir);

        service
            .set_field(SettingField::EventKey, "spring-rally".into())
            .await
            .unwrap();

        assert_eq!(service.store().get(SettingField::EventKey), "spring-rally");
        let stored = SettingsFile::in_dir(dir.path()).load().await.unwrap();
        assert_eq!(stored.event_key.as_deref(), Some("spring-rally"));
    }

    #[tokio::test]
    async fn start_and_stop_sync_announce_once() {
        let dir = TempDir::new().unwrap();
        let db = NamedTempFile::new().unwrap();
        let service = service_in(&dir);
        service
            .choose_database(Some(db.path().to_path_buf()))
            .await
            .unwrap();
        service
            .save_settings("key".into(), "demo".into())
            .await
            .unwrap();
        service
            .set_field(SettingField::ServerUrl, "https://derby.test".into())
            .await
            .unwrap();
        let mut stream = service.events().subscribe(service.events().last_event_id());

        let target = service.start_sync().unwrap();
        assert_eq!(target.upload_url(), "https://derby.test/api/data");
        service.start_sync().unwrap();
        assert!(service.is_running());
        assert!(service.stop_sync());
        assert!(!service.stop_sync());
        assert!(!service.is_running());

        let started = stream.next().await.unwrap();
        let stopped = stream.next().await.unwrap();
        assert_eq!(started.event, Event::SyncStarted);
        assert_eq!(stopped.event, Event::SyncStopped);
        assert_eq!(service.events().last_event_id(), Some(stopped.id));
    }

    #[test]
    fn start_sync_without_settings_stays_stopped() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir);

        let err = service.start_sync().unwrap_err();

        assert!(matches!(err, AppError::NotReady { .. }));
        assert!(!service.is_running());
        assert_eq!(service.events().last_event_id(), Some(1));
    }

    #[test]
    fn initial_values_are_not_forwarded_as_changes() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir);
        assert_eq!(service.events().last_event_id(), None);

        service.store().set(SettingField::ServerUrl, "https://derby.test");
        assert_eq!(service.events().last_event_id(), Some(1));
    }

    #[test]
    fn dropping_service_stops_forwarding() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SettingsStore::new());
        let service = SettingsService::new(
            Arc::clone(&store),
            Arc::new(SettingsFile::in_dir(dir.path())),
            EventBus::new(),
        );
        drop(service);
        for field in SettingField::ALL {
            assert_eq!(store.field(field).subscriber_count(), 0);
        }
    }
}
