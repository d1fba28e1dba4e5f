//! `derby-sync` command line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use derby_config::{AppSettings, ConfigError, ConfigSnapshot, SettingField};
use derby_telemetry::{LogFormat, LoggingConfig};

use crate::bootstrap::{AppConfig, build_service};
use crate::error::{AppError, AppResult};
use crate::service::SettingsService;

const MASKED_SECRET: &str = "********";

/// Command line arguments for `derby-sync`.
#[derive(Debug, Parser)]
#[command(name = "derby-sync", version, about = "Manage derby live sync settings")]
pub struct Cli {
    /// Directory containing `settings.json`.
    #[arg(long, env = "DERBY_SETTINGS_DIR", default_value = ".")]
    pub settings_dir: PathBuf,
    /// Override the sync server compiled into this build.
    #[arg(long, env = "DERBY_SERVER_URL")]
    pub server_url: Option<String>,
    /// Log output format (`json` or `pretty`).
    #[arg(long, value_parser = parse_log_format)]
    pub log_format: Option<LogFormat>,
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Settings commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print the current settings as JSON.
    Show {
        /// Print the API key instead of masking it.
        #[arg(long)]
        reveal: bool,
    },
    /// Print the chosen database path.
    DatabasePath,
    /// Print a single setting by its camelCase name.
    Get {
        /// Setting to print.
        #[arg(value_parser = parse_field)]
        field: SettingField,
    },
    /// Replace a single setting by its camelCase name.
    Set {
        /// Setting to replace.
        #[arg(value_parser = parse_field)]
        field: SettingField,
        /// New value; an empty string clears it.
        value: String,
    },
    /// Save the API key and event key.
    SaveSettings {
        /// Key presented to the sync server.
        #[arg(long)]
        api_key: String,
        /// Event the results belong to.
        #[arg(long)]
        event_key: String,
    },
    /// Choose the race database, or clear it when no path is given.
    ChooseDatabase {
        /// Path to the race database.
        path: Option<PathBuf>,
    },
    /// Verify the settings are complete enough to sync.
    Check,
    /// Validate the settings and start syncing.
    StartSync,
    /// Stop syncing.
    StopSync,
}

impl Cli {
    /// Logging configuration derived from the arguments.
    #[must_use]
    pub fn logging(&self) -> LoggingConfig<'static> {
        let mut logging = LoggingConfig::default();
        if let Some(format) = self.log_format {
            logging.format = format;
        }
        logging
    }

    /// Application configuration derived from the arguments.
    #[must_use]
    pub fn app_config(&self) -> AppConfig {
        let defaults = AppConfig::default();
        AppConfig {
            settings_dir: self.settings_dir.clone(),
            server_url: self.server_url.clone().unwrap_or(defaults.server_url),
        }
    }
}

/// Execute the parsed command and return the text to print.
///
/// # Errors
///
/// Returns an error if settings cannot be loaded or saved, or if `check` or
/// `start-sync` finds the settings incomplete.
pub async fn run(cli: Cli) -> AppResult<String> {
    let service = build_service(&cli.app_config()).await?;
    execute(&service, cli.command).await
}

/// Execute `command` against an existing service.
///
/// # Errors
///
/// See [`run`].
pub async fn execute(service: &SettingsService, command: Command) -> AppResult<String> {
    match command {
        Command::Show { reveal } => {
            let snapshot = service.store().snapshot();
            let snapshot = if reveal { snapshot } else { mask(snapshot) };
            serde_json::to_string_pretty(&AppSettings::from(&snapshot)).map_err(|source| {
                AppError::config("settings.render", ConfigError::Serialize { source })
            })
        }
        Command::DatabasePath => Ok(service.fetch_database_path()),
        Command::Get { field } => Ok(service.store().get(field)),
        Command::Set { field, value } => {
            service.set_field(field, value).await?;
            Ok(format!("{field} saved"))
        }
        Command::SaveSettings { api_key, event_key } => {
            service.save_settings(api_key, event_key).await?;
            Ok("settings saved".to_string())
        }
        Command::ChooseDatabase { path } => {
            let chosen = service.choose_database(path).await?;
            if chosen.is_empty() {
                Ok("no database selected".to_string())
            } else {
                Ok(chosen)
            }
        }
        Command::Check => {
            let target = service.check_sync_ready()?;
            Ok(format!("ready: uploading to {}", target.upload_url()))
        }
        Command::StartSync => {
            let target = service.start_sync()?;
            Ok(format!("sync started: uploading to {}", target.upload_url()))
        }
        Command::StopSync => {
            if service.stop_sync() {
                Ok("sync stopped".to_string())
            } else {
                Ok("sync was not running".to_string())
            }
        }
    }
}

fn parse_field(value: &str) -> Result<SettingField, String> {
    value.parse().map_err(|err: ConfigError| {
        let names: Vec<_> = SettingField::ALL.into_iter().map(SettingField::as_str).collect();
        format!("{err} `{value}` (expected one of {})", names.join(", "))
    })
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value
        .parse()
        .map_err(|err| format!("{err} `{value}` (expected json or pretty)"))
}

fn mask(mut snapshot: ConfigSnapshot) -> ConfigSnapshot {
    for field in SettingField::ALL.into_iter().filter(|field| field.is_secret()) {
        if !snapshot.value(field).is_empty() {
            MASKED_SECRET.clone_into(snapshot.value_mut(field));
        }
    }
    snapshot
}
