//! Error types for drivesync-core
//!
//! Every variant is fatal to a sync run. Failing to read a single source file
//! is not an error here: the engine records it as a warned entry and moves on.

/// Result type for drivesync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a sync run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Destination root does not exist
    #[error("Destination \"{path}\" does not exist")]
    DestinationMissing { path: String },

    /// Destination root exists but is not a directory
    #[error("Destination \"{path}\" is not a directory/folder")]
    DestinationNotDirectory { path: String },

    /// Source tree could not be enumerated
    #[error("Failed to enumerate {path}: {source}")]
    Traversal {
        path: String,
        #[source]
        source: drivesync_fs::Error,
    },

    /// An entry could not be examined (existence, kind or size)
    #[error("Failed to stat {path}: {source}")]
    Classification {
        path: String,
        #[source]
        source: drivesync_fs::Error,
    },

    /// Exclusion glob failed to compile
    #[error("Invalid exclusion pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// Destination file or directory could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: drivesync_fs::Error,
    },

    /// Modification time could not be read or set
    #[error("Failed to read or set modification time of {path}: {source}")]
    Mtime {
        path: String,
        #[source]
        source: drivesync_fs::Error,
    },

    /// Filesystem error from drivesync-fs
    #[error(transparent)]
    Fs(#[from] drivesync_fs::Error),
}

impl Error {
    /// Path the failure is attached to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::DestinationMissing { path }
            | Self::DestinationNotDirectory { path }
            | Self::Traversal { path, .. }
            | Self::Classification { path, .. }
            | Self::Write { path, .. }
            | Self::Mtime { path, .. } => Some(path),
            Self::Pattern { .. } | Self::Fs(_) => None,
        }
    }

    pub(crate) fn classification(path: &str, source: drivesync_fs::Error) -> Self {
        Self::Classification {
            path: path.to_string(),
            source,
        }
    }

    pub(crate) fn mtime(path: &str, source: drivesync_fs::Error) -> Self {
        Self::Mtime {
            path: path.to_string(),
            source,
        }
    }

    pub(crate) fn write(path: &str, source: drivesync_fs::Error) -> Self {
        Self::Write {
            path: path.to_string(),
            source,
        }
    }
}
