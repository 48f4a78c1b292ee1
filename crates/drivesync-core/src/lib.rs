//! Synchronization engine for drivesync
//!
//! Copies a tree from a source [`Vfs`](drivesync_fs::Vfs) into a destination
//! one, transferring a file only when its destination is missing or older,
//! and restoring directory modification times once all content is in place.
//!
//! # Architecture
//!
//! ```text
//!                  SyncEngine
//!                      |
//!     +-----------+----+-------+--------------+
//!     |           |            |              |
//! path_map    exclude      change      drivesync-fs (Vfs)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use drivesync_core::{SyncEngine, SyncOptions};
//! use drivesync_fs::LocalFs;
//!
//! fn example() -> drivesync_core::Result<()> {
//!     let local = LocalFs::new();
//!     let options = SyncOptions::default();
//!     let report = SyncEngine::new(&local, &local, &options)?.sync("photos/", "/backup")?;
//!     println!("{} copied", report.summary().copied);
//!     Ok(())
//! }
//! ```

pub mod change;
pub mod error;
pub mod exclude;
pub mod options;
pub mod path_map;
pub mod sync;

pub use change::{need_to_copy, truncate_to_second};
pub use error::{Error, Result};
pub use exclude::ExclusionFilter;
pub use options::{SyncConfig, SyncOptions};
pub use path_map::{anchored_dest_path, dest_path};
pub use sync::{Action, EntryReport, Summary, SyncEngine, SyncReport};
