//! Command implementations for drivesync-cli

pub mod sync;

pub use sync::{resolve_options, run_sync};
