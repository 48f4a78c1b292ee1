//! Shared test utilities for the drivesync workspace.
//!
//! - [`tree`]: on-disk source trees with explicit modification times
//! - [`recording`]: a [`Vfs`](drivesync_fs::Vfs) wrapper that logs every call

pub mod recording;
pub mod tree;

pub use recording::{Call, RecordingVfs};
pub use tree::{DiskTree, epoch};
