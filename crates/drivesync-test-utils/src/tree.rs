//! On-disk fixture trees.
//!
//! Files are written first and stamped last, so the mtimes a test asks for
//! are the ones it sees even after children have been added.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use filetime::FileTime;
use tempfile::TempDir;

/// `UNIX_EPOCH + secs`.
pub fn epoch(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

/// A temporary directory populated through a small builder API.
///
/// # Panics
/// Every method panics if the underlying filesystem operation fails.
pub struct DiskTree {
    temp: TempDir,
    stamps: Vec<(PathBuf, SystemTime)>,
}

impl Default for DiskTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DiskTree {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap_or_else(|e| panic!("DiskTree: failed to create temp dir: {e}")),
            stamps: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Absolute path of `rel` as a VFS path string.
    pub fn vfs_path(&self, rel: &str) -> String {
        if rel.is_empty() {
            return self.path().to_string_lossy().into_owned();
        }
        self.path().join(rel).to_string_lossy().into_owned()
    }

    /// Create directory `rel` (and parents) with mtime `secs`.
    pub fn dir(mut self, rel: &str, secs: u64) -> Self {
        let path = self.path().join(rel);
        fs::create_dir_all(&path)
            .unwrap_or_else(|e| panic!("DiskTree: failed to create {}: {e}", path.display()));
        self.stamps.push((path, epoch(secs)));
        self
    }

    /// Write file `rel` with `content` and mtime `secs`. Parents must exist.
    pub fn file(mut self, rel: &str, content: &str, secs: u64) -> Self {
        let path = self.path().join(rel);
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("DiskTree: failed to write {}: {e}", path.display()));
        self.stamps.push((path, epoch(secs)));
        self
    }

    /// Apply the recorded mtimes, deepest entries first.
    pub fn stamp(mut self) -> Self {
        self.stamps.sort_by(|a, b| b.0.cmp(&a.0));
        for (path, when) in &self.stamps {
            filetime::set_file_mtime(path, FileTime::from_system_time(*when))
                .unwrap_or_else(|e| panic!("DiskTree: failed to stamp {}: {e}", path.display()));
        }
        self
    }

    /// Modification time of `rel`.
    pub fn mtime(&self, rel: &str) -> SystemTime {
        let path = self.path().join(rel);
        fs::metadata(&path)
            .and_then(|m| m.modified())
            .unwrap_or_else(|e| panic!("DiskTree: failed to stat {}: {e}", path.display()))
    }

    /// Content of file `rel`.
    pub fn read(&self, rel: &str) -> String {
        let path = self.path().join(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("DiskTree: failed to read {}: {e}", path.display()))
    }
}
