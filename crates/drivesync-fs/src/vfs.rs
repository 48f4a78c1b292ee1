//! The capability contract every storage backend implements.

use std::io::Read;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Classification of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    File,
    /// Symlinks, devices, sockets and anything else the engine does not copy.
    Other,
}

impl EntryKind {
    pub fn is_dir(self) -> bool {
        self == Self::Directory
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Directory => "dir",
            Self::File => "file",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// How a backend persists the bytes of [`Vfs::write_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Write to a temporary entry next to the destination, then rename it
    /// into place. A failed write leaves the previous destination intact.
    #[default]
    Atomic,
    /// Truncate the destination and write straight into it. Faster, but a
    /// failed write leaves a partial destination behind.
    InPlace,
}

impl WriteMode {
    pub fn from_in_place(in_place: bool) -> Self {
        if in_place { Self::InPlace } else { Self::Atomic }
    }
}

/// Storage backend used by the sync engine.
///
/// Paths are `/`-separated strings. `exists` is the only operation that
/// reports a missing entry as a normal value (`Ok(false)`); everything else
/// returns an error carrying the path, so callers can tell "absent" apart
/// from a transport or permission failure.
pub trait Vfs: Send + Sync {
    /// Check whether `path` exists.
    fn exists(&self, path: &str) -> Result<bool>;

    /// Classify `path` as directory, regular file, or other.
    fn kind(&self, path: &str) -> Result<EntryKind>;

    /// List every entry under `root`, including `root` itself.
    ///
    /// Order is unspecified; callers sort.
    fn tree(&self, root: &str) -> Result<Vec<String>>;

    /// Modification time of `path`.
    fn mtime(&self, path: &str) -> Result<SystemTime>;

    /// Set the modification time of `path`.
    fn set_mtime(&self, path: &str, mtime: SystemTime) -> Result<()>;

    /// Create a single directory. The parent must already exist.
    fn mkdir(&self, path: &str) -> Result<()>;

    /// Open `path` for streaming reads.
    fn open_read(&self, path: &str) -> Result<Box<dyn Read + '_>>;

    /// Replace the content of `path` with everything `reader` yields.
    ///
    /// Returns the number of bytes written.
    fn write_from(&self, path: &str, reader: &mut dyn Read, mode: WriteMode) -> Result<u64>;

    /// Size of `path` in bytes.
    fn size(&self, path: &str) -> Result<u64>;
}
