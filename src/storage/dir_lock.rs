use std::{
    fs::{File, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::util::{Result, Status};

pub const LOCK_FILE_NAME: &str = "LOCK";

/// Exclusive advisory lock on a data directory.
///
/// Released when dropped, or by the OS if the process dies.
#[derive(Debug)]
pub struct DirLock {
    file: File,
    path: PathBuf,
}

impl DirLock {
    /// Lock `dir`, failing with `Busy` if another handle holds it.
    pub fn acquire(dir: &Path) -> Result<Self> {
        let path = dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| Status::io_error(format!("Failed to open {}: {e}", path.display())))?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!(path = %path.display(), "acquired data directory lock");
                Ok(DirLock { file, path })
            }
            Err(e) if is_contended(&e) => Err(Status::busy(format!(
                "Data directory {} is locked by another store",
                dir.display()
            ))),
            Err(e) => Err(Status::io_error(format!(
                "Failed to lock {}: {e}",
                path.display()
            ))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "failed to release data directory lock");
        }
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
