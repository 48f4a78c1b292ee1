//! SyncEngine for copying a tree between two backends
//!
//! This module provides:
//! - **engine**: traversal, per-entry decisions and the deferred directory
//!   mtime restoration pass
//! - **report**: per-entry records describing what happened

mod engine;
mod report;

pub use engine::SyncEngine;
pub use report::{Action, EntryReport, Summary, SyncReport};
