//! Four-field settings store shared across the application.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use tracing::debug;

use crate::field::SettingField;
use crate::model::ConfigSnapshot;
use crate::observable::{Observable, Subscription};

/// Observable record of the sync client settings.
///
/// Every field starts as the empty string. Share it behind an `Arc`; each
/// field is locked independently.
#[derive(Default)]
pub struct SettingsStore {
    database_path: Observable<String>,
    api_key: Observable<String>,
    event_key: Observable<String>,
    server_url: Observable<String>,
}

impl SettingsStore {
    /// Create a store with every field empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: ConfigSnapshot) -> Self {
        Self {
            database_path: Observable::new(snapshot.database_path),
            api_key: Observable::new(snapshot.api_key),
            event_key: Observable::new(snapshot.event_key),
            server_url: Observable::new(snapshot.server_url),
        }
    }

    /// Cell backing `field`.
    #[must_use]
    pub const fn field(&self, field: SettingField) -> &Observable<String> {
        match field {
            SettingField::DatabasePath => &self.database_path,
            SettingField::ApiKey => &self.api_key,
            SettingField::EventKey => &self.event_key,
            SettingField::ServerUrl => &self.server_url,
        }
    }

    /// Current value of `field`.
    #[must_use]
    pub fn get(&self, field: SettingField) -> String {
        self.field(field).get()
    }

    /// Replace `field` and notify its subscribers. Any string is accepted.
    pub fn set(&self, field: SettingField, value: impl Into<String>) {
        debug!(%field, "setting updated");
        self.field(field).set(value.into());
    }

    /// Subscribe to `field`; the callback fires immediately and on every set.
    pub fn subscribe<F>(&self, field: SettingField, callback: F) -> Subscription
    where
        F: FnMut(&String) + Send + 'static,
    {
        self.field(field).subscribe(callback)
    }

    /// Subscribe to every field with one callback receiving `(field, value)`.
    ///
    /// The callback fires once per field immediately, in [`SettingField::ALL`]
    /// order.
    pub fn subscribe_all<F>(&self, callback: F) -> Subscription
    where
        F: Fn(SettingField, &str) + Send + Sync + 'static,
    {
        let callback = Arc::new(callback);
        Subscription::merge(SettingField::ALL.map(|field| {
            let callback = Arc::clone(&callback);
            self.subscribe(field, move |value| callback(field, value))
        }))
    }

    /// Copy every field.
    #[must_use]
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            database_path: self.database_path.get(),
            api_key: self.api_key.get(),
            event_key: self.event_key.get(),
            server_url: self.server_url.get(),
        }
    }

    /// Set every field from `snapshot`, notifying each field's subscribers.
    pub fn apply(&self, snapshot: ConfigSnapshot) {
        let ConfigSnapshot {
            database_path,
            api_key,
            event_key,
            server_url,
        } = snapshot;
        self.set(SettingField::DatabasePath, database_path);
        self.set(SettingField::ApiKey, api_key);
        self.set(SettingField::EventKey, event_key);
        self.set(SettingField::ServerUrl, server_url);
    }
}

impl Debug for SettingsStore {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.get().is_empty() {
            ""
        } else {
            "<redacted>"
        };
        formatter
            .debug_struct("SettingsStore")
            .field("database_path", &self.database_path.get())
            .field("api_key", &api_key)
            .field("event_key", &self.event_key.get())
            .field("server_url", &self.server_url.get())
            .finish()
    }
}
