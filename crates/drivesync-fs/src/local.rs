//! Local disk backend

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use filetime::FileTime;
use walkdir::WalkDir;

use crate::{EntryKind, Error, Result, Vfs, WriteMode};

/// [`Vfs`] over the local filesystem.
///
/// Paths are used as given: relative paths resolve against the process
/// working directory and the empty path means the working directory itself.
/// Symbolic links are never followed, so they classify as [`EntryKind::Other`].
#[derive(Debug, Default, Clone)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }

    fn resolve(path: &str) -> &Path {
        if path.is_empty() {
            Path::new(".")
        } else {
            Path::new(path)
        }
    }

    fn metadata(path: &str) -> Result<fs::Metadata> {
        fs::symlink_metadata(Self::resolve(path)).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound { path: path.to_string() },
            _ => Error::io(path, e),
        })
    }

    /// Temp sibling used by atomic writes: `.{name}.{pid}.tmp`.
    fn temp_path(target: &Path) -> Result<PathBuf> {
        let name = target.file_name().ok_or_else(|| Error::InvalidPath {
            path: target.to_string_lossy().into_owned(),
            reason: "no file name to write to".into(),
        })?;
        let temp_name = format!(".{}.{}.tmp", name.to_string_lossy(), std::process::id());
        Ok(target.with_file_name(temp_name))
    }

    fn copy_to_temp(path: &str, temp_path: &Path, reader: &mut dyn Read) -> Result<u64> {
        let temp_display = temp_path.to_string_lossy().into_owned();
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)
            .map_err(|e| Error::io(&temp_display, e))?;
        let written = io::copy(reader, &mut temp_file).map_err(|e| Error::io(path, e))?;
        // Flush to disk before the rename makes the content visible
        temp_file
            .sync_all()
            .map_err(|e| Error::io(&temp_display, e))?;
        Ok(written)
    }

    fn write_atomic(path: &str, target: &Path, reader: &mut dyn Read) -> Result<u64> {
        let temp_path = Self::temp_path(target)?;

        match Self::copy_to_temp(path, &temp_path, reader) {
            Ok(written) => {
                fs::rename(&temp_path, target).map_err(|e| {
                    let _ = fs::remove_file(&temp_path);
                    Error::io(path, e)
                })?;
                Ok(written)
            }
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                Err(e)
            }
        }
    }

    fn write_in_place(path: &str, target: &Path, reader: &mut dyn Read) -> Result<u64> {
        let mut file = File::create(target).map_err(|e| Error::io(path, e))?;
        let written = io::copy(reader, &mut file).map_err(|e| Error::io(path, e))?;
        file.flush().map_err(|e| Error::io(path, e))?;
        Ok(written)
    }
}

impl Vfs for LocalFs {
    fn exists(&self, path: &str) -> Result<bool> {
        match fs::symlink_metadata(Self::resolve(path)) {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
                Ok(false)
            }
            Err(e) => Err(Error::io(path, e)),
        }
    }

    fn kind(&self, path: &str) -> Result<EntryKind> {
        let file_type = Self::metadata(path)?.file_type();
        Ok(if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        })
    }

    fn tree(&self, root: &str) -> Result<Vec<String>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(Self::resolve(root)).follow_links(false) {
            let entry = entry.map_err(|e| {
                let at = e
                    .path()
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_else(|| root.to_string());
                match e.into_io_error() {
                    Some(source) => Error::io(at, source),
                    None => Error::InvalidPath {
                        path: at,
                        reason: "filesystem loop detected".into(),
                    },
                }
            })?;
            entries.push(entry.path().to_string_lossy().into_owned());
        }
        tracing::trace!(root, count = entries.len(), "Enumerated local tree");
        Ok(entries)
    }

    fn mtime(&self, path: &str) -> Result<SystemTime> {
        Self::metadata(path)?.modified().map_err(|e| Error::io(path, e))
    }

    fn set_mtime(&self, path: &str, mtime: SystemTime) -> Result<()> {
        filetime::set_file_mtime(Self::resolve(path), FileTime::from_system_time(mtime))
            .map_err(|e| Error::io(path, e))
    }

    fn mkdir(&self, path: &str) -> Result<()> {
        fs::create_dir(Self::resolve(path)).map_err(|e| Error::io(path, e))
    }

    fn open_read(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        let file = File::open(Self::resolve(path)).map_err(|e| Error::io(path, e))?;
        Ok(Box::new(file))
    }

    fn write_from(&self, path: &str, reader: &mut dyn Read, mode: WriteMode) -> Result<u64> {
        let target = Self::resolve(path);

        // An existing destination must be something we can replace with a file.
        match fs::symlink_metadata(target) {
            Ok(meta) if meta.is_dir() => {
                return Err(Error::InvalidPath {
                    path: path.to_string(),
                    reason: "exists and is a directory".into(),
                });
            }
            _ => {}
        }

        let written = match mode {
            WriteMode::Atomic => Self::write_atomic(path, target, reader)?,
            WriteMode::InPlace => Self::write_in_place(path, target, reader)?,
        };
        tracing::debug!(path, bytes = written, ?mode, "Wrote local file");
        Ok(written)
    }

    fn size(&self, path: &str) -> Result<u64> {
        Ok(Self::metadata(path)?.len())
    }
}
