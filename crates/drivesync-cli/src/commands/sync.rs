//! The sync command: option layering, backend routing and report output

use std::path::{Path, PathBuf};

use colored::{ColoredString, Colorize};

use drivesync_core::{Action, EntryReport, SyncConfig, SyncEngine, SyncOptions, SyncReport};

use crate::cli::Cli;
use crate::error::{CliError, Result};
use crate::location::Location;

/// `<config dir>/drivesync/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("drivesync").join("config.toml"))
}

/// Merge the configuration file (if any) with command-line flags.
///
/// Flags can only switch booleans on and raise verbosity; their exclusion
/// patterns are appended after the configured ones.
pub fn resolve_options(cli: &Cli) -> Result<SyncOptions> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_default_config()?,
    };

    let mut options = SyncOptions::from(config);
    options.dry_run |= cli.dry_run;
    options.write_in_place |= cli.inplace;
    options.verbosity = options.verbosity.max(cli.verbose);
    options.exclude.extend(cli.exclude.iter().cloned());
    Ok(options)
}

fn load_default_config() -> Result<SyncConfig> {
    match default_config_path() {
        Some(path) if path.is_file() => load_config(&path),
        _ => Ok(SyncConfig::default()),
    }
}

/// Load a config file, surfacing file-level failures as filesystem errors.
fn load_config(path: &Path) -> Result<SyncConfig> {
    SyncConfig::load(path).map_err(|e| match e {
        drivesync_core::Error::Fs(fs) if fs.is_not_found() => CliError::user(format!(
            "Config file {} does not exist",
            path.display()
        )),
        drivesync_core::Error::Fs(fs) => CliError::Fs(fs),
        other => CliError::Core(other),
    })
}

/// Sync every source into the destination, in command-line order.
///
/// All addresses are routed before the first sync starts, so an unsupported
/// backend fails the run without touching anything.
pub fn run_sync(cli: &Cli, options: &SyncOptions) -> Result<()> {
    let dest = Location::parse(cli.destination());
    let dest_vfs = dest.backend()?;
    let sources = cli
        .sources()
        .iter()
        .map(|address| {
            let location = Location::parse(address);
            location.backend().map(|vfs| (location, vfs))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut reports = Vec::with_capacity(sources.len());
    for (source, source_vfs) in &sources {
        let engine = SyncEngine::new(source_vfs.as_ref(), dest_vfs.as_ref(), options)?;
        let report = engine.sync(source.path(), dest.path())?;
        if !cli.json {
            print_report(&report, options.verbosity);
        }
        reports.push(report);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(())
}

fn print_report(report: &SyncReport, verbosity: u8) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };

    for entry in &report.entries {
        let quiet = matches!(entry.action, Action::Unchanged | Action::Excluded { .. });
        if quiet && verbosity == 0 {
            continue;
        }
        println!("{}{} {}", prefix, label(&entry.action), describe(entry));
    }

    let summary = report.summary();
    println!(
        "{}{}: {} copied, {} created, {} unchanged, {} excluded, {} warned ({} bytes)",
        prefix,
        report.source_root.bold(),
        summary.copied,
        summary.created,
        summary.unchanged,
        summary.excluded,
        summary.warned,
        summary.bytes_copied
    );
}

fn label(action: &Action) -> ColoredString {
    let text = format!("{:>9}", action.label());
    match action {
        Action::Copied => text.green(),
        Action::Created => text.cyan(),
        Action::Warned { .. } => text.yellow(),
        Action::Unchanged | Action::Excluded { .. } => text.dimmed(),
    }
}

fn describe(entry: &EntryReport) -> String {
    let path = entry.dest.as_deref().unwrap_or(&entry.source);
    match &entry.action {
        Action::Excluded { pattern } => format!("{} (matches {})", path, pattern),
        Action::Warned { reason } => format!("{} ({})", entry.source, reason),
        Action::Copied => match entry.size {
            Some(size) => format!("{} ({} bytes)", path, size),
            None => path.to_string(),
        },
        Action::Created | Action::Unchanged => path.to_string(),
    }
}
