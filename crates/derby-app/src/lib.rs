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

//! Derby live sync client wiring.
//!
//! Layout: `bootstrap.rs` (settings loading and service wiring), `service.rs`
//! (settings commands), `cli.rs` (`derby-sync` arguments and dispatch).

/// Startup wiring and settings loading.
pub mod bootstrap;
/// Command line parsing and dispatch.
pub mod cli;
/// Application error types.
pub mod error;
/// Settings command handlers.
pub mod service;

pub use bootstrap::{AppConfig, build_service, build_service_with, init_telemetry};
pub use error::{AppError, AppResult};
pub use service::SettingsService;
