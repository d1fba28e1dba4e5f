//! # Design
//!
//! - Centralize application-level errors for bootstrap and settings commands.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration operations failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: derby_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: derby_telemetry::TelemetryError,
    },
    /// Settings are not complete enough to start a sync run.
    #[error("sync settings incomplete")]
    NotReady {
        /// First failed precondition.
        source: derby_config::SyncReadinessError,
    },
}

impl AppError {
    pub(crate) const fn config(operation: &'static str, source: derby_config::ConfigError) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: derby_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn app_error_helpers_build_variants() {
        let config = AppError::config(
            "settings.load",
            derby_config::ConfigError::UnknownField {
                value: "bad".to_string(),
            },
        );
        assert!(matches!(
            config,
            AppError::Config {
                operation: "settings.load",
                ..
            }
        ));

        let telemetry = AppError::telemetry(
            "telemetry.init",
            derby_telemetry::TelemetryError::UnknownLogFormat {
                value: "xml".to_string(),
            },
        );
        assert!(matches!(telemetry, AppError::Telemetry { .. }));
    }

    #[test]
    fn not_ready_exposes_reason_as_source() {
        let err = AppError::NotReady {
            source: derby_config::SyncReadinessError::MissingApiKey,
        };
        assert_eq!(err.to_string(), "sync settings incomplete");
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("api key is not set")
        );
    }
}
