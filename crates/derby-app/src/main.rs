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

//! Binary entrypoint for the `derby-sync` settings tool.

use anyhow::Context;
use clap::Parser;
use derby_app::cli::{Cli, run};
use derby_app::init_telemetry;

/// Parse arguments, run the command, and print its output.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(&cli.logging()).context("failed to initialise logging")?;

    let output = run(cli).await.context("derby-sync command failed")?;
    println!("{output}");
    Ok(())
}
