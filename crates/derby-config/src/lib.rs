#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Observable settings store for the derby sync client.
//!
//! Layout: `observable.rs` (generic change-notifying cell), `field.rs` (field
//! identifiers), `store.rs` (`SettingsStore`), `model.rs` (snapshot and
//! persisted models), `loader.rs` (`settings.json` persistence),
//! `readiness.rs` (sync precondition checks).

pub mod defaults;
pub mod error;
pub mod field;
pub mod loader;
pub mod model;
pub mod observable;
pub mod readiness;
pub mod store;

pub use error::{ConfigError, ConfigResult};
pub use field::SettingField;
pub use loader::{SettingsFile, SettingsRepository};
pub use model::{AppSettings, ConfigSnapshot};
pub use observable::{Observable, Subscription};
pub use readiness::{SyncReadinessError, SyncTarget};
pub use store::SettingsStore;
