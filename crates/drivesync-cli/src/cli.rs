//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// drivesync - Mirror directory trees by modification time
///
/// Copies every source into DEST. A source ending in '/' copies its contents;
/// without the slash the directory itself is copied.
#[derive(Parser, Debug)]
#[command(name = "drivesync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Show what would be copied without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip entries whose name matches GLOB (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Overwrite destination files directly instead of via a temporary file
    #[arg(long)]
    pub inplace: bool,

    /// Increase log detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(long, value_name = "FILE", env = "DRIVESYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the sync reports as JSON
    #[arg(long)]
    pub json: bool,

    /// Sources followed by the destination directory
    #[arg(value_name = "PATH", required = true, num_args = 2..)]
    pub paths: Vec<String>,
}

impl Cli {
    /// Every positional argument but the last.
    pub fn sources(&self) -> &[String] {
        match self.paths.split_last() {
            Some((_, sources)) => sources,
            None => &[],
        }
    }

    /// The last positional argument.
    pub fn destination(&self) -> &str {
        self.paths.last().map_or("", String::as_str)
    }
}
