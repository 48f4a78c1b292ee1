//! Address routing: which backend serves a command-line path

use drivesync_fs::{LocalFs, Vfs};

use crate::error::{CliError, Result};

/// Prefixes that address the remote drive instead of the local filesystem.
const REMOTE_PREFIXES: &[&str] = &["gdrive:", "g:"];

/// A command-line path split into backend and backend-relative path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location<'a> {
    Local(&'a str),
    Remote(&'a str),
}

impl<'a> Location<'a> {
    pub fn parse(address: &'a str) -> Self {
        REMOTE_PREFIXES
            .iter()
            .find_map(|prefix| address.strip_prefix(prefix))
            .map_or(Self::Local(address), Self::Remote)
    }

    /// Path handed to the backend.
    pub fn path(&self) -> &'a str {
        match *self {
            Self::Local(path) | Self::Remote(path) => path,
        }
    }

    /// Backend serving this location.
    pub fn backend(&self) -> Result<Box<dyn Vfs>> {
        match self {
            Self::Local(_) => Ok(Box::new(LocalFs::new())),
            Self::Remote(path) => Err(CliError::user(format!(
                "remote drive path '{}' is not supported by this build (local paths only)",
                path
            ))),
        }
    }
}
