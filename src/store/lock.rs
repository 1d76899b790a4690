use std::{
    fs::{File, OpenOptions, TryLockError},
    path::Path,
};

use crate::prelude::*;

/// Exclusive access to the store, released when dropped.
#[must_use]
pub struct StoreLock {
    file: File,
}

impl StoreLock {
    /// Take the lock without waiting; `None` means another run holds it.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn try_acquire(path: &Path) -> Result<Option<Self>> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .with_context(|| format!("failed to open the lock file `{}`", path.display()))?;
        match file.try_lock() {
            Ok(()) => {
                debug!("acquired");
                Ok(Some(Self { file }))
            }
            Err(TryLockError::WouldBlock) => Ok(None),
            Err(TryLockError::Error(error)) => {
                Err(error).with_context(|| format!("failed to lock `{}`", path.display()))
            }
        }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(error) = self.file.unlock() {
            warn!("failed to release the store lock: {error:#}");
        }
    }
}
