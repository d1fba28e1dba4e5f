//! Event payload types surfaced to the client interface.

use chrono::{DateTime, Utc};

/// Identifier assigned to each published event.
pub type EventId = u64;

/// Default buffer size for the in-memory replay ring.
pub const DEFAULT_REPLAY_CAPACITY: usize = 256;

/// Notifications emitted while choosing a database and toggling sync.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A race database was chosen (or cleared, when the path is empty).
    DatabaseChosen {
        /// Resulting database path.
        database_path: String,
    },
    /// Synchronisation started watching the database.
    SyncStarted,
    /// Synchronisation stopped.
    SyncStopped,
    /// Synchronisation could not start.
    SyncError {
        /// Human-readable failure detail.
        message: String,
    },
    /// A setting was replaced. Values are not carried on the bus.
    SettingChanged {
        /// camelCase name of the field that changed.
        field: String,
    },
}

impl Event {
    /// Machine-friendly discriminator used as the client event name.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DatabaseChosen { .. } => "database_chosen",
            Self::SyncStarted => "sync_started",
            Self::SyncStopped => "sync_stopped",
            Self::SyncError { .. } => "sync_error",
            Self::SettingChanged { .. } => "setting_changed",
        }
    }
}

/// Metadata wrapper around events. Each envelope tracks the event id and emission timestamp.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct EventEnvelope {
    /// Monotonic identifier assigned to the wrapped event.
    pub id: EventId,
    /// Timestamp recording when the envelope was produced.
    pub timestamp: DateTime<Utc>,
    /// Wrapped event payload.
    pub event: Event,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_kind_maps_every_variant() {
        let cases = [
            (
                Event::DatabaseChosen {
                    database_path: "/races/derby.sqlite".into(),
                },
                "database_chosen",
            ),
            (Event::SyncStarted, "sync_started"),
            (Event::SyncStopped, "sync_stopped"),
            (
                Event::SyncError {
                    message: "api key is not set".into(),
                },
                "sync_error",
            ),
            (
                Event::SettingChanged {
                    field: "eventKey".into(),
                },
                "setting_changed",
            ),
        ];
        for (event, expected) in cases {
            assert_eq!(event.kind(), expected);
        }
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let value = serde_json::to_value(Event::DatabaseChosen {
            database_path: "/tmp/race.db".into(),
        })
        .unwrap();
        assert_eq!(
            value,
            json!({ "type": "database_chosen", "database_path": "/tmp/race.db" })
        );
        assert_eq!(
            serde_json::to_value(Event::SyncStopped).unwrap(),
            json!({ "type": "sync_stopped" })
        );
    }
}
