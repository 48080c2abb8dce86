//! netmend CLI
//!
//! Command-line tool for computing remediation, rollback, diff, and report
//! output from network device configurations.

#![deny(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use netmend_cli::{run_with, Cli};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let output = run_with(&cli)?;
    print!("{output}");
    Ok(())
}
