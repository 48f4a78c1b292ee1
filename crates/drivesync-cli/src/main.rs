//! drivesync CLI
//!
//! Mirrors one or more source trees into a destination directory.

mod cli;
mod commands;
mod error;
mod location;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::Cli;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let options = commands::resolve_options(&cli)?;

    init_tracing(options.log_level())?;
    tracing::debug!(?options, "Resolved sync options");

    commands::run_sync(&cli, &options)
}

fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(level >= Level::DEBUG)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {}", e)))
}
