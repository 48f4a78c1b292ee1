//! In-memory backend modelled on a cloud-drive store

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Cursor, Read};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use crate::path::{join, key, segments};
use crate::{EntryKind, Error, Result, Vfs, WriteMode};

#[derive(Debug, Clone)]
enum Node {
    Dir { mtime: SystemTime },
    File { data: Vec<u8>, mtime: SystemTime },
    Other { mtime: SystemTime },
}

impl Node {
    fn kind(&self) -> EntryKind {
        match self {
            Self::Dir { .. } => EntryKind::Directory,
            Self::File { .. } => EntryKind::File,
            Self::Other { .. } => EntryKind::Other,
        }
    }

    fn mtime(&self) -> SystemTime {
        match self {
            Self::Dir { mtime } | Self::File { mtime, .. } | Self::Other { mtime } => *mtime,
        }
    }

    fn set_mtime(&mut self, value: SystemTime) {
        match self {
            Self::Dir { mtime } | Self::File { mtime, .. } | Self::Other { mtime } => *mtime = value,
        }
    }
}

/// [`Vfs`] held entirely in memory.
///
/// Entries are keyed by their normalized segments, so `/a/b`, `a/b` and
/// `./a//b` all name the same entry, much like a drive that has no notion
/// of a working directory. The empty key is the drive root and always
/// exists as a directory.
#[derive(Debug)]
pub struct MemoryFs {
    nodes: Mutex<BTreeMap<String, Node>>,
    failing_reads: Mutex<BTreeSet<String>>,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFs {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(String::new(), Node::Dir { mtime: SystemTime::now() });
        Self {
            nodes: Mutex::new(nodes),
            failing_reads: Mutex::new(BTreeSet::new()),
        }
    }

    fn nodes(&self) -> MutexGuard<'_, BTreeMap<String, Node>> {
        self.nodes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn parent_key(key: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }
        Some(match key.rfind('/') {
            Some(idx) => key[..idx].to_string(),
            None => String::new(),
        })
    }

    /// Create every missing ancestor of `key` as a directory.
    fn ensure_parents(nodes: &mut BTreeMap<String, Node>, key: &str, mtime: SystemTime) {
        let parts = segments(key);
        for depth in 1..parts.len() {
            nodes
                .entry(parts[..depth].join("/"))
                .or_insert(Node::Dir { mtime });
        }
    }

    fn require_parent_dir(nodes: &BTreeMap<String, Node>, path: &str, key: &str) -> Result<()> {
        let Some(parent) = Self::parent_key(key) else {
            return Err(Error::InvalidPath {
                path: path.to_string(),
                reason: "the drive root cannot be replaced".into(),
            });
        };
        match nodes.get(&parent) {
            Some(Node::Dir { .. }) => Ok(()),
            Some(_) => Err(Error::NotADirectory { path: parent }),
            None => Err(Error::NotFound { path: parent }),
        }
    }

    /// Add (or update) a directory, creating missing ancestors.
    pub fn add_dir(&self, path: &str, mtime: SystemTime) -> &Self {
        let key = key(path);
        let mut nodes = self.nodes();
        Self::ensure_parents(&mut nodes, &key, mtime);
        nodes.insert(key, Node::Dir { mtime });
        self
    }

    /// Add (or replace) a file, creating missing ancestors.
    pub fn add_file(&self, path: &str, content: impl Into<Vec<u8>>, mtime: SystemTime) -> &Self {
        let key = key(path);
        let mut nodes = self.nodes();
        Self::ensure_parents(&mut nodes, &key, mtime);
        nodes.insert(
            key,
            Node::File {
                data: content.into(),
                mtime,
            },
        );
        self
    }

    /// Add an entry that is neither a file nor a directory (a link or device).
    pub fn add_other(&self, path: &str, mtime: SystemTime) -> &Self {
        let key = key(path);
        let mut nodes = self.nodes();
        Self::ensure_parents(&mut nodes, &key, mtime);
        nodes.insert(key, Node::Other { mtime });
        self
    }

    /// Make every subsequent `open_read` of `path` fail.
    pub fn fail_reads(&self, path: &str) -> &Self {
        self.failing_reads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key(path));
        self
    }

    /// Content of the file at `path`, if there is one.
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        match self.nodes().get(&key(path)) {
            Some(Node::File { data, .. }) => Some(data.clone()),
            _ => None,
        }
    }

    /// Normalized keys of every entry, drive root excluded.
    pub fn paths(&self) -> Vec<String> {
        self.nodes()
            .keys()
            .filter(|k| !k.is_empty())
            .cloned()
            .collect()
    }

    fn with_node<T>(&self, path: &str, f: impl FnOnce(&Node) -> T) -> Result<T> {
        self.nodes()
            .get(&key(path))
            .map(f)
            .ok_or_else(|| Error::NotFound {
                path: path.to_string(),
            })
    }
}

impl Vfs for MemoryFs {
    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.nodes().contains_key(&key(path)))
    }

    fn kind(&self, path: &str) -> Result<EntryKind> {
        self.with_node(path, Node::kind)
    }

    fn tree(&self, root: &str) -> Result<Vec<String>> {
        let root_key = key(root);
        let nodes = self.nodes();
        let Some(node) = nodes.get(&root_key) else {
            return Err(Error::NotFound {
                path: root.to_string(),
            });
        };

        let mut entries = vec![root.to_string()];
        if node.kind().is_dir() {
            let prefix = if root_key.is_empty() {
                String::new()
            } else {
                format!("{}/", root_key)
            };
            entries.extend(
                nodes
                    .keys()
                    .filter(|k| !k.is_empty() && k.starts_with(&prefix))
                    .map(|k| join(root, &k[prefix.len()..])),
            );
        }
        Ok(entries)
    }

    fn mtime(&self, path: &str) -> Result<SystemTime> {
        self.with_node(path, Node::mtime)
    }

    fn set_mtime(&self, path: &str, mtime: SystemTime) -> Result<()> {
        match self.nodes().get_mut(&key(path)) {
            Some(node) => {
                node.set_mtime(mtime);
                Ok(())
            }
            None => Err(Error::NotFound {
                path: path.to_string(),
            }),
        }
    }

    fn mkdir(&self, path: &str) -> Result<()> {
        let key = key(path);
        let mut nodes = self.nodes();
        if nodes.contains_key(&key) {
            return Err(Error::io(
                path,
                io::Error::new(io::ErrorKind::AlreadyExists, "entry already exists"),
            ));
        }
        Self::require_parent_dir(&nodes, path, &key)?;
        nodes.insert(
            key,
            Node::Dir {
                mtime: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn open_read(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        let key = key(path);
        if self
            .failing_reads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&key)
        {
            return Err(Error::ReadFailed {
                path: path.to_string(),
            });
        }
        match self.nodes().get(&key) {
            Some(Node::File { data, .. }) => Ok(Box::new(Cursor::new(data.clone()))),
            Some(_) => Err(Error::InvalidPath {
                path: path.to_string(),
                reason: "not a regular file".into(),
            }),
            None => Err(Error::NotFound {
                path: path.to_string(),
            }),
        }
    }

    fn write_from(&self, path: &str, reader: &mut dyn Read, mode: WriteMode) -> Result<u64> {
        let key = key(path);
        {
            let mut nodes = self.nodes();
            Self::require_parent_dir(&nodes, path, &key)?;
            if let Some(Node::Dir { .. }) = nodes.get(&key) {
                return Err(Error::InvalidPath {
                    path: path.to_string(),
                    reason: "exists and is a directory".into(),
                });
            }
            if mode == WriteMode::InPlace {
                nodes.insert(
                    key.clone(),
                    Node::File {
                        data: Vec::new(),
                        mtime: SystemTime::now(),
                    },
                );
            }
        }

        // The lock is released while streaming so the reader may be backed
        // by this same store.
        let mut data = Vec::new();
        let copied = reader.read_to_end(&mut data);

        let mut nodes = self.nodes();
        match copied {
            Ok(written) => {
                nodes.insert(
                    key,
                    Node::File {
                        data,
                        mtime: SystemTime::now(),
                    },
                );
                Ok(written as u64)
            }
            Err(e) => {
                if mode == WriteMode::InPlace {
                    nodes.insert(
                        key,
                        Node::File {
                            data,
                            mtime: SystemTime::now(),
                        },
                    );
                }
                Err(Error::io(path, e))
            }
        }
    }

    fn size(&self, path: &str) -> Result<u64> {
        self.with_node(path, |node| match node {
            Node::File { data, .. } => data.len() as u64,
            _ => 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn keys_ignore_leading_and_relative_segments() {
        let fs = MemoryFs::new();
        fs.add_file("/a/b.txt", "x", at(10));
        assert!(fs.exists("a/b.txt").unwrap());
        assert!(fs.exists("./a//b.txt").unwrap());
        assert_eq!(fs.kind("/a").unwrap(), EntryKind::Directory);
    }

    #[test]
    fn tree_keeps_root_spelling() {
        let fs = MemoryFs::new();
        fs.add_file("/d1/foo/bar", "x", at(10));
        let mut tree = fs.tree("/d1/").unwrap();
        tree.sort();
        assert_eq!(tree, vec!["/d1/", "/d1/foo", "/d1/foo/bar"]);
    }

    #[test]
    fn tree_of_file_is_just_the_file() {
        let fs = MemoryFs::new();
        fs.add_file("f", "x", at(10));
        assert_eq!(fs.tree("f").unwrap(), vec!["f"]);
    }

    #[test]
    fn mkdir_requires_parent() {
        let fs = MemoryFs::new();
        let err = fs.mkdir("missing/child").unwrap_err();
        assert!(err.is_not_found());
        fs.mkdir("missing").unwrap();
        fs.mkdir("missing/child").unwrap();
        assert!(fs.mkdir("missing").is_err());
    }

    #[test]
    fn in_place_write_keeps_partial_data_on_failure() {
        struct Failing(bool);
        impl Read for Failing {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.0 {
                    return Err(io::Error::other("boom"));
                }
                self.0 = true;
                buf[..3].copy_from_slice(b"abc");
                Ok(3)
            }
        }

        let fs = MemoryFs::new();
        fs.add_file("f", "original", at(10));

        assert!(fs.write_from("f", &mut Failing(false), WriteMode::Atomic).is_err());
        assert_eq!(fs.contents("f").unwrap(), b"original");

        assert!(fs.write_from("f", &mut Failing(false), WriteMode::InPlace).is_err());
        assert_eq!(fs.contents("f").unwrap(), b"abc");
    }
}
