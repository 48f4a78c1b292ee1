//! SyncEngine implementation
//!
//! The SyncEngine walks a source tree in sorted order, creates directories
//! and copies changed files into the destination, then restores directory
//! modification times bottom-up.

use std::io::{self, Read};
use std::time::UNIX_EPOCH;

use drivesync_fs::{EntryKind, Vfs, WriteMode};

use crate::change::need_to_copy;
use crate::exclude::ExclusionFilter;
use crate::options::SyncOptions;
use crate::path_map::anchored_dest_path;
use crate::{Error, Result};

use super::report::{Action, EntryReport, SyncReport};

/// A directory seen during the main pass, restored after all content is copied.
#[derive(Debug, Clone)]
struct DirectoryPair {
    source: String,
    dest: String,
}

/// Reader adapter remembering whether the source side failed.
///
/// Lets a failed `write_from` be attributed to the source (skip the entry)
/// or to the destination (abort the run).
struct SourceReader<'r> {
    inner: Box<dyn Read + 'r>,
    failure: Option<String>,
}

impl Read for SourceReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).inspect_err(|e| {
            if e.kind() != io::ErrorKind::Interrupted {
                self.failure = Some(e.to_string());
            }
        })
    }
}

/// Engine for synchronizing a source tree into a destination directory
///
/// The engine never inspects which backends it holds; both sides are plain
/// [`Vfs`] trait objects. Runs are single-threaded and one entry is fully
/// handled before the next.
pub struct SyncEngine<'a> {
    source: &'a dyn Vfs,
    dest: &'a dyn Vfs,
    options: &'a SyncOptions,
    filter: ExclusionFilter,
}

impl<'a> SyncEngine<'a> {
    /// Create a new SyncEngine
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pattern`] if an exclusion pattern is not a valid glob.
    pub fn new(source: &'a dyn Vfs, dest: &'a dyn Vfs, options: &'a SyncOptions) -> Result<Self> {
        Ok(Self {
            source,
            dest,
            options,
            filter: ExclusionFilter::new(options.exclude.as_slice())?,
        })
    }

    /// Copy `source_root` into the directory `dest_root`.
    ///
    /// A `source_root` ending in `/` copies its contents; without the slash
    /// the directory itself is recreated inside `dest_root`. A file
    /// `source_root` is copied on its own.
    ///
    /// # Errors
    ///
    /// Aborts on the first structural failure: missing destination,
    /// enumeration, classification, directory creation, write, or mtime
    /// failures. An unreadable source file is reported as
    /// [`Action::Warned`] instead.
    pub fn sync(&self, source_root: &str, dest_root: &str) -> Result<SyncReport> {
        self.check_destination(dest_root)?;

        let mut entries = self.entries(source_root)?;
        // Guarantee that a directory is processed before anything inside it
        entries.sort();

        let mut report = SyncReport::new(source_root, dest_root, self.options.dry_run);
        let mut dir_pairs = Vec::new();

        for src in &entries {
            if let Some(pattern) = self.filter.matching_pattern(src) {
                tracing::debug!("{} excluded from copy (matched {:?})", src, pattern);
                report.entries.push(EntryReport {
                    source: src.clone(),
                    dest: None,
                    kind: None,
                    action: Action::Excluded {
                        pattern: pattern.to_string(),
                    },
                    size: None,
                });
                continue;
            }

            let dst = anchored_dest_path(source_root, dest_root, src);
            let kind = self
                .source
                .kind(src)
                .map_err(|e| Error::classification(src, e))?;

            let entry = match kind {
                EntryKind::Directory => {
                    let entry = self.sync_dir(src, &dst)?;
                    dir_pairs.push(DirectoryPair {
                        source: src.clone(),
                        dest: dst,
                    });
                    entry
                }
                EntryKind::File => self.sync_file(src, dst)?,
                EntryKind::Other => {
                    tracing::warn!("Skipping {:?}: not a regular file or directory", src);
                    EntryReport {
                        source: src.clone(),
                        dest: Some(dst),
                        kind: Some(kind),
                        action: Action::Warned {
                            reason: "not a regular file or directory".into(),
                        },
                        size: None,
                    }
                }
            };
            report.entries.push(entry);
        }

        if !self.options.dry_run {
            report.restored = self.restore_dir_mtimes(&dir_pairs)?;
        }

        Ok(report)
    }

    fn check_destination(&self, dest_root: &str) -> Result<()> {
        let exists = self
            .dest
            .exists(dest_root)
            .map_err(|e| Error::classification(dest_root, e))?;
        if !exists {
            return Err(Error::DestinationMissing {
                path: dest_root.to_string(),
            });
        }

        let kind = self
            .dest
            .kind(dest_root)
            .map_err(|e| Error::classification(dest_root, e))?;
        if !kind.is_dir() {
            return Err(Error::DestinationNotDirectory {
                path: dest_root.to_string(),
            });
        }
        Ok(())
    }

    fn entries(&self, source_root: &str) -> Result<Vec<String>> {
        let kind = self
            .source
            .kind(source_root)
            .map_err(|e| Error::classification(source_root, e))?;
        if !kind.is_dir() {
            return Ok(vec![source_root.to_string()]);
        }
        self.source
            .tree(source_root)
            .map_err(|source| Error::Traversal {
                path: source_root.to_string(),
                source,
            })
    }

    fn sync_dir(&self, src: &str, dst: &str) -> Result<EntryReport> {
        let exists = self
            .dest
            .exists(dst)
            .map_err(|e| Error::classification(dst, e))?;

        let action = if exists {
            Action::Unchanged
        } else {
            if self.options.dry_run {
                tracing::info!("[dry-run] Would create {}", dst);
            } else {
                self.dest.mkdir(dst).map_err(|e| Error::write(dst, e))?;
                tracing::info!("{}", dst);
            }
            Action::Created
        };

        Ok(EntryReport {
            source: src.to_string(),
            dest: Some(dst.to_string()),
            kind: Some(EntryKind::Directory),
            action,
            size: None,
        })
    }

    fn sync_file(&self, src: &str, dst: String) -> Result<EntryReport> {
        let size = self
            .source
            .size(src)
            .map_err(|e| Error::classification(src, e))?;

        let action = if !need_to_copy(self.source, self.dest, src, &dst)? {
            Action::Unchanged
        } else if self.options.dry_run {
            tracing::info!("[dry-run] Would copy {}", dst);
            Action::Copied
        } else {
            match self.copy_file(src, &dst)? {
                None => {
                    tracing::info!("{}", dst);
                    Action::Copied
                }
                Some(reason) => {
                    tracing::warn!("Skipping {:?}: {}", src, reason);
                    Action::Warned { reason }
                }
            }
        };

        Ok(EntryReport {
            source: src.to_string(),
            dest: Some(dst),
            kind: Some(EntryKind::File),
            action,
            size: Some(size),
        })
    }

    /// Transfer one file and carry its mtime over.
    ///
    /// Returns `Some(reason)` when the source could not be read; the
    /// entry is then skipped and the run goes on. A partial file left by an
    /// in-place write gets an epoch mtime so it never looks up to date.
    fn copy_file(&self, src: &str, dst: &str) -> Result<Option<String>> {
        let inner = match self.source.open_read(src) {
            Ok(reader) => reader,
            Err(e) => return Ok(Some(e.to_string())),
        };
        let mut reader = SourceReader {
            inner,
            failure: None,
        };

        let mode = self.options.write_mode();
        if let Err(e) = self.dest.write_from(dst, &mut reader, mode) {
            let Some(reason) = reader.failure else {
                return Err(Error::write(dst, e));
            };
            let partial = mode == WriteMode::InPlace
                && self
                    .dest
                    .exists(dst)
                    .map_err(|e| Error::classification(dst, e))?;
            if partial {
                // Backdate the partial file so the next run copies it again
                self.dest
                    .set_mtime(dst, UNIX_EPOCH)
                    .map_err(|e| Error::mtime(dst, e))?;
            }
            return Ok(Some(format!("read failed for {}: {}", src, reason)));
        }

        let mtime = self.source.mtime(src).map_err(|e| Error::mtime(src, e))?;
        self.dest
            .set_mtime(dst, mtime)
            .map_err(|e| Error::mtime(dst, e))?;
        Ok(None)
    }

    /// Restore directory mtimes deepest-first.
    ///
    /// Writing into a directory updates its mtime on most filesystems, so
    /// this runs after every copy and walks the pairs in reverse of the
    /// order they were recorded.
    fn restore_dir_mtimes(&self, pairs: &[DirectoryPair]) -> Result<Vec<String>> {
        let mut restored = Vec::with_capacity(pairs.len());
        for pair in pairs.iter().rev() {
            let mtime = self
                .source
                .mtime(&pair.source)
                .map_err(|e| Error::mtime(&pair.source, e))?;
            self.dest
                .set_mtime(&pair.dest, mtime)
                .map_err(|e| Error::mtime(&pair.dest, e))?;
            tracing::trace!("restored mtime of {}", pair.dest);
            restored.push(pair.dest.clone());
        }
        Ok(restored)
    }
}
