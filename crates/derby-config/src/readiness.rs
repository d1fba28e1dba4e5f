//! Preconditions for starting a sync run.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::defaults::UPLOAD_PATH;
use crate::model::ConfigSnapshot;

/// Reasons a snapshot cannot drive a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncReadinessError {
    /// No race database has been chosen.
    #[error("database path is not set")]
    MissingDatabasePath,
    /// No API key has been saved.
    #[error("api key is not set")]
    MissingApiKey,
    /// No event key has been saved.
    #[error("event key is not set")]
    MissingEventKey,
    /// No server URL is configured.
    #[error("server url is not set")]
    MissingServerUrl,
    /// The chosen database no longer exists.
    #[error("database path does not exist")]
    NonExistentDatabasePath {
        /// Path that was checked.
        path: PathBuf,
    },
}

/// Settings validated for a sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    database_path: PathBuf,
    api_key: String,
    event_key: String,
    server_url: String,
}

impl SyncTarget {
    /// Validate `snapshot`, reporting the first missing field in field order.
    ///
    /// # Errors
    ///
    /// Returns [`SyncReadinessError`] when a field is empty or the database
    /// path does not exist.
    pub fn try_from_snapshot(snapshot: &ConfigSnapshot) -> Result<Self, SyncReadinessError> {
        let database_path = required(
            &snapshot.database_path,
            SyncReadinessError::MissingDatabasePath,
        )?;
        let api_key = required(&snapshot.api_key, SyncReadinessError::MissingApiKey)?;
        let event_key = required(&snapshot.event_key, SyncReadinessError::MissingEventKey)?;
        let server_url = required(&snapshot.server_url, SyncReadinessError::MissingServerUrl)?;

        let database_path = PathBuf::from(database_path);
        if !database_path.exists() {
            return Err(SyncReadinessError::NonExistentDatabasePath {
                path: database_path,
            });
        }

        Ok(Self {
            database_path,
            api_key: api_key.to_string(),
            event_key: event_key.to_string(),
            server_url: server_url.to_string(),
        })
    }

    /// Race database to read from.
    #[must_use]
    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    /// Key sent in the `x-api-key` header.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Event the results are filed under.
    #[must_use]
    pub fn event_key(&self) -> &str {
        &self.event_key
    }

    /// Base URL of the sync server.
    #[must_use]
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Endpoint that receives uploaded race data.
    #[must_use]
    pub fn upload_url(&self) -> String {
        format!("{}{UPLOAD_PATH}", self.server_url.trim_end_matches('/'))
    }
}

fn required(value: &str, missing: SyncReadinessError) -> Result<&str, SyncReadinessError> {
    if value.is_empty() {
        Err(missing)
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn complete(database_path: &Path) -> ConfigSnapshot {
        ConfigSnapshot {
            database_path: database_path.to_string_lossy().into_owned(),
            api_key: "key".into(),
            event_key: "demo".into(),
            server_url: "http://localhost:4000".into(),
        }
    }

    #[test]
    fn complete_snapshot_is_ready() {
        let db = NamedTempFile::new().unwrap();
        let target = SyncTarget::try_from_snapshot(&complete(db.path())).unwrap();
        assert_eq!(target.database_path(), db.path());
        assert_eq!(target.api_key(), "key");
        assert_eq!(target.event_key(), "demo");
        assert_eq!(target.server_url(), "http://localhost:4000");
        assert_eq!(target.upload_url(), "http://localhost:4000/api/data");
    }

    #[test]
    fn missing_fields_reported_in_order() {
        let db = NamedTempFile::new().unwrap();
        let mut snapshot = ConfigSnapshot::default();
        assert_eq!(
            SyncTarget::try_from_snapshot(&snapshot),
            Err(SyncReadinessError::MissingDatabasePath)
        );

        snapshot.database_path = db.path().to_string_lossy().into_owned();
        assert_eq!(
            SyncTarget::try_from_snapshot(&snapshot),
            Err(SyncReadinessError::MissingApiKey)
        );

        snapshot.api_key = "key".into();
        assert_eq!(
            SyncTarget::try_from_snapshot(&snapshot),
            Err(SyncReadinessError::MissingEventKey)
        );

        snapshot.event_key = "demo".into();
        assert_eq!(
            SyncTarget::try_from_snapshot(&snapshot),
            Err(SyncReadinessError::MissingServerUrl)
        );
    }

    #[test]
    fn vanished_database_is_rejected() {
        let path = {
            let db = NamedTempFile::new().unwrap();
            db.path().to_path_buf()
        };
        let err = SyncTarget::try_from_snapshot(&complete(&path)).unwrap_err();
        assert_eq!(err, SyncReadinessError::NonExistentDatabasePath { path });
    }

    #[test]
    fn upload_url_avoids_double_slash() {
        let db = NamedTempFile::new().unwrap();
        let mut snapshot = complete(db.path());
        snapshot.server_url = "https://derby-live.fly.dev/".into();
        let target = SyncTarget::try_from_snapshot(&snapshot).unwrap();
        assert_eq!(target.upload_url(), "https://derby-live.fly.dev/api/data");
    }
}
