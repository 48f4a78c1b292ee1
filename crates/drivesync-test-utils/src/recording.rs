//! Call-recording VFS wrapper.

use std::io::Read;
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use drivesync_fs::{EntryKind, Result, Vfs, WriteMode};

/// One call made through a [`RecordingVfs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Exists(String),
    Kind(String),
    Tree(String),
    Mtime(String),
    SetMtime(String, SystemTime),
    Mkdir(String),
    OpenRead(String),
    WriteFrom(String, WriteMode),
    Size(String),
}

impl Call {
    /// Whether the call changes the backend.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Self::SetMtime(..) | Self::Mkdir(_) | Self::WriteFrom(..))
    }
}

/// Forwards every operation to `inner` and records it.
pub struct RecordingVfs<V> {
    inner: V,
    calls: Mutex<Vec<Call>>,
}

impl<V: Vfs> RecordingVfs<V> {
    pub fn new(inner: V) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &V {
        &self.inner
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Only the calls that change the backend.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    /// Paths passed to `set_mtime`, in call order.
    pub fn set_mtime_paths(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SetMtime(path, _) => Some(path),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl<V: Vfs> Vfs for RecordingVfs<V> {
    fn exists(&self, path: &str) -> Result<bool> {
        self.record(Call::Exists(path.into()));
        self.inner.exists(path)
    }

    fn kind(&self, path: &str) -> Result<EntryKind> {
        self.record(Call::Kind(path.into()));
        self.inner.kind(path)
    }

    fn tree(&self, root: &str) -> Result<Vec<String>> {
        self.record(Call::Tree(root.into()));
        self.inner.tree(root)
    }

    fn mtime(&self, path: &str) -> Result<SystemTime> {
        self.record(Call::Mtime(path.into()));
        self.inner.mtime(path)
    }

    fn set_mtime(&self, path: &str, mtime: SystemTime) -> Result<()> {
        self.record(Call::SetMtime(path.into(), mtime));
        self.inner.set_mtime(path, mtime)
    }

    fn mkdir(&self, path: &str) -> Result<()> {
        self.record(Call::Mkdir(path.into()));
        self.inner.mkdir(path)
    }

    fn open_read(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        self.record(Call::OpenRead(path.into()));
        self.inner.open_read(path)
    }

    fn write_from(&self, path: &str, reader: &mut dyn Read, mode: WriteMode) -> Result<u64> {
        self.record(Call::WriteFrom(path.into(), mode));
        self.inner.write_from(path, reader, mode)
    }

    fn size(&self, path: &str) -> Result<u64> {
        self.record(Call::Size(path.into()));
        self.inner.size(path)
    }
}
