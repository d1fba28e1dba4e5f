//! Build-time defaults for the settings file and sync server.

/// File name used for persisted settings inside the settings directory.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Sync server used by release builds.
pub const PRODUCTION_SERVER_URL: &str = "https://derby-live.fly.dev";

/// Sync server used during local development.
pub const DEVELOPMENT_SERVER_URL: &str = "http://localhost:4000";

/// Path appended to the server URL when uploading race data.
pub const UPLOAD_PATH: &str = "/api/data";

/// Server URL compiled into this build.
#[must_use]
pub const fn default_server_url() -> &'static str {
    if cfg!(feature = "production") {
        PRODUCTION_SERVER_URL
    } else {
        DEVELOPMENT_SERVER_URL
    }
}
