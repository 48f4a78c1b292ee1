//! Modification-time change detection

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use drivesync_fs::Vfs;

use crate::{Error, Result};

/// Drop the sub-second part of `time`, rounding towards the past.
pub fn truncate_to_second(time: SystemTime) -> SystemTime {
    match time.duration_since(UNIX_EPOCH) {
        Ok(since) => UNIX_EPOCH + Duration::from_secs(since.as_secs()),
        Err(before) => {
            let before = before.duration();
            let secs = before.as_secs() + u64::from(before.subsec_nanos() > 0);
            UNIX_EPOCH - Duration::from_secs(secs)
        }
    }
}

/// Decide whether `src` must be copied over `dst`.
///
/// A missing destination always needs a copy. Otherwise the copy happens
/// only when the source is strictly newer once both times are truncated to
/// whole seconds; content is never compared.
pub fn need_to_copy(source: &dyn Vfs, dest: &dyn Vfs, src: &str, dst: &str) -> Result<bool> {
    let exists = dest
        .exists(dst)
        .map_err(|e| Error::classification(dst, e))?;
    if !exists {
        tracing::debug!("need_to_copy: destination {:?} does not exist; will copy", dst);
        return Ok(true);
    }

    let src_mtime = truncate_to_second(source.mtime(src).map_err(|e| Error::mtime(src, e))?);
    let dst_mtime = truncate_to_second(dest.mtime(dst).map_err(|e| Error::mtime(dst, e))?);

    if src_mtime > dst_mtime {
        tracing::debug!(
            "need_to_copy: {:?}: source is newer than destination ({:?} > {:?}); will copy",
            src,
            src_mtime,
            dst_mtime
        );
        Ok(true)
    } else {
        tracing::debug!(
            "need_to_copy: {:?}: source is not newer than destination ({:?} <= {:?}); will not copy",
            src,
            src_mtime,
            dst_mtime
        );
        Ok(false)
    }
}
