//! Identifiers for the individual settings held by the store.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One named string slot in the settings snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingField {
    /// Path to the race database being synchronised.
    DatabasePath,
    /// Key presented to the sync server.
    ApiKey,
    /// Event the uploaded results belong to.
    EventKey,
    /// Base URL of the sync server.
    ServerUrl,
}

impl SettingField {
    /// Every field, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::DatabasePath,
        Self::ApiKey,
        Self::EventKey,
        Self::ServerUrl,
    ];

    /// Render the field as its camelCase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DatabasePath => "databasePath",
            Self::ApiKey => "apiKey",
            Self::EventKey => "eventKey",
            Self::ServerUrl => "serverUrl",
        }
    }

    /// Whether the value should be masked when displayed.
    #[must_use]
    pub const fn is_secret(self) -> bool {
        matches!(self, Self::ApiKey)
    }
}

impl Display for SettingField {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for SettingField {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownField {
                value: s.to_string(),
            })
    }
}
