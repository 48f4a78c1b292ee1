//! Virtual filesystem layer for drivesync
//!
//! Defines the [`Vfs`] capability contract the sync engine consumes and the
//! backends that implement it: [`LocalFs`] for local disks and [`MemoryFs`]
//! for an in-memory, drive-like store.

pub mod config;
pub mod error;
pub mod local;
pub mod memory;
pub mod path;
pub mod vfs;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use local::LocalFs;
pub use memory::MemoryFs;
pub use path::{basename, segments};
pub use vfs::{EntryKind, Vfs, WriteMode};
