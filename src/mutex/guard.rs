//! RAII lock guard implementation.

use super::operations::FileMutex;
use crate::error::Result;
use crate::fs::FileStore;
use crate::process::ProcessRegistry;
use tracing::warn;

/// RAII guard for a held [`FileMutex`].
///
/// When dropped, the lock file is deleted. If deletion fails, a warning is
/// logged but no panic occurs.
#[derive(Debug)]
pub struct MutexGuard<'a, R: ProcessRegistry, S: FileStore> {
    mutex: &'a FileMutex<R, S>,

    /// Whether the lock has been released manually.
    released: bool,
}

impl<'a, R: ProcessRegistry, S: FileStore> MutexGuard<'a, R, S> {
    pub(super) fn new(mutex: &'a FileMutex<R, S>) -> Self {
        Self {
            mutex,
            released: false,
        }
    }

    pub fn mutex(&self) -> &FileMutex<R, S> {
        self.mutex
    }

    /// Release now and report failures instead of logging them.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.mutex.release()
    }
}

impl<R: ProcessRegistry, S: FileStore> Drop for MutexGuard<'_, R, S> {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = self.mutex.release()
        {
            warn!(key = %self.mutex.key(), "failed to release lock: {}", e);
        }
    }
}
