//! Exclusive, non-blocking lock on the cache root.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;

use crate::error::{PackageError, Result};

/// Lock file name inside the cache root.
pub const LOCK_FILE: &str = ".lock";

/// Held cache lock; released when dropped.
#[derive(Debug)]
pub struct CacheLock {
    file: File,
    path: PathBuf,
}

impl CacheLock {
    /// Take the lock on `<cache_root>/.lock` without waiting.
    ///
    /// Fails with [`PackageError::LockBusy`] if another holder exists.
    pub fn try_acquire(cache_root: &Path) -> Result<Self> {
        let path = cache_root.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|err| PackageError::io(&path, err))?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self { file, path }),
            Err(err) if err.kind() == ErrorKind::WouldBlock => Err(PackageError::LockBusy { path }),
            Err(err) => Err(PackageError::io(path, err)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
