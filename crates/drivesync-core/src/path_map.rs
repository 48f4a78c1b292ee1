//! Destination path derivation with rsync-style trailing-slash semantics
//!
//! `photos/` copies the *contents* of `photos` into the destination, while
//! `photos` copies the directory itself, creating `<dest>/photos`.

use drivesync_fs::segments;

/// Compute where `source_path`, found under `source_root`, lands below `dest_root`.
///
/// All three inputs are reduced to their segments first: empty, `.` and `..`
/// segments are dropped rather than resolved, so degenerate roots such as
/// `""`, `"."`, `"/"` and `".."` contribute nothing. The result has no leading
/// separator.
///
/// ```
/// use drivesync_core::dest_path;
///
/// assert_eq!(dest_path("/d1", "/dest", "/d1/foo"), "dest/d1/foo");
/// assert_eq!(dest_path("/d1/", "/dest", "/d1/foo"), "dest/foo");
/// ```
pub fn dest_path(source_root: &str, dest_root: &str, source_path: &str) -> String {
    let root = segments(source_root);
    let file = segments(source_path);
    let relative = file.get(root.len()..).unwrap_or_default();

    let mut dest = segments(dest_root);
    if !source_root.ends_with('/')
        && let Some(last) = root.last()
    {
        dest.push(*last);
    }
    dest.extend_from_slice(relative);
    dest.join("/")
}

/// [`dest_path`], kept absolute when `dest_root` is absolute.
///
/// This is the form the engine hands to the destination backend, so a
/// local destination such as `/backup` is not reinterpreted relative to
/// the working directory.
pub fn anchored_dest_path(source_root: &str, dest_root: &str, source_path: &str) -> String {
    let mapped = dest_path(source_root, dest_root, source_path);
    if dest_root.starts_with('/') {
        format!("/{}", mapped)
    } else {
        mapped
    }
}
