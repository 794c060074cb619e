//! Lock acquisition and release.

use super::cancel::CancelFlag;
use super::guard::MutexGuard;
use super::key::LockKey;
use crate::config::Settings;
use crate::error::{MutexError, Result};
use crate::fs::{FileStore, LocalFileStore};
use crate::process::{Pid, ProcessRegistry, SystemProcesses};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// What the lock file says about its holder.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Holder {
    /// No lock file.
    Absent,
    /// Lock file naming a process.
    Pid(Pid),
    /// Lock file whose content is not a process id.
    Garbled(String),
}

/// Cross-process mutex keyed by name, backed by `{lock_dir}/{key}`.
///
/// The lock file holds the decimal pid of the holder. A holder that died
/// without releasing is detected after the wait budget and its lock taken
/// over. Instances are cheap handles: two `FileMutex` values with the same
/// key and settings are interchangeable, and nothing is tracked in-process,
/// so acquiring twice from one process simply waits on itself.
#[derive(Debug, Clone)]
pub struct FileMutex<R = SystemProcesses, S = LocalFileStore> {
    key: LockKey,
    settings: Settings,
    registry: R,
    store: S,
}

impl FileMutex {
    /// Mutex for `key` using the host's processes and local filesystem.
    pub fn new(key: impl Into<String>, settings: Settings) -> Result<Self> {
        Self::with_collaborators(key, settings, SystemProcesses, LocalFileStore)
    }
}

impl<R: ProcessRegistry, S: FileStore> FileMutex<R, S> {
    /// Mutex for `key` with explicit process registry and file store.
    pub fn with_collaborators(
        key: impl Into<String>,
        settings: Settings,
        registry: R,
        store: S,
    ) -> Result<Self> {
        let key = LockKey::new(key)?;
        settings.validate()?;

        Ok(Self {
            key,
            settings,
            registry,
            store,
        })
    }

    pub fn key(&self) -> &LockKey {
        &self.key
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn registry(&self) -> &R {
        &self.registry
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    /// Path of this key's lock file.
    pub fn lock_path(&self) -> PathBuf {
        self.settings.lock_dir().join(self.key.as_str())
    }

    /// Block until the lock is held or the wait budget runs out.
    ///
    /// Polls for the lock file to disappear for up to `max_wait`. After that
    /// the recorded holder is probed: a dead (or unreadable) holder is
    /// replaced by this process, a live one yields [`MutexError::LockTimeout`].
    pub fn acquire(&self) -> Result<()> {
        self.acquire_with_cancel(&CancelFlag::new())
    }

    /// [`acquire`](Self::acquire) that gives up with
    /// [`MutexError::Cancelled`] once `cancel` is set during a wait.
    pub fn acquire_with_cancel(&self, cancel: &CancelFlag) -> Result<()> {
        let dir = self.settings.lock_dir();
        self.store.ensure_dir(&dir).map_err(|e| {
            MutexError::io(
                format!("failed to create lock directory '{}'", dir.display()),
                e,
            )
        })?;

        let path = dir.join(self.key.as_str());
        let me = self.registry.current_process_id();
        let max_wait = self.settings.max_wait();
        let poll_interval = self.settings.poll_interval();
        let start = Instant::now();
        let mut lost_after_wait = false;

        loop {
            let elapsed = start.elapsed();

            if elapsed >= max_wait {
                match self.read_holder(&path)? {
                    Holder::Absent => {
                        debug!(key = %self.key, pid = %me, "lock file gone after wait, claiming");
                        if self.publish(&path, me)? {
                            return Ok(());
                        }
                        // Judge the winner right away; back off if it keeps vanishing.
                        if lost_after_wait {
                            self.pause(cancel, poll_interval)?;
                        }
                        lost_after_wait = true;
                        continue;
                    }
                    Holder::Garbled(content) => {
                        warn!(
                            key = %self.key,
                            content = %content.escape_debug(),
                            "lock file does not name a process, overwriting with {}",
                            me
                        );
                        self.overwrite(&path, me)?;
                        return Ok(());
                    }
                    Holder::Pid(holder) if !self.registry.process_exists(holder) => {
                        info!(
                            key = %self.key,
                            stale = %holder,
                            "no process found for lock holder, overwriting with {}",
                            me
                        );
                        self.overwrite(&path, me)?;
                        return Ok(());
                    }
                    Holder::Pid(holder) => {
                        return Err(MutexError::LockTimeout {
                            key: self.key.to_string(),
                            elapsed: start.elapsed(),
                            holder,
                        });
                    }
                }
            }

            if !self.store.exists(&path) && self.publish(&path, me)? {
                return Ok(());
            }

            let nap = poll_interval.min(max_wait.saturating_sub(start.elapsed()));
            debug!(key = %self.key, wait_ms = nap.as_millis() as u64, "lock held, waiting");
            self.pause(cancel, nap)?;
        }
    }

    /// Acquire and return a guard that releases the lock when dropped.
    pub fn lock(&self) -> Result<MutexGuard<'_, R, S>> {
        self.acquire()?;
        Ok(MutexGuard::new(self))
    }

    /// [`lock`](Self::lock) with a cancel flag.
    pub fn lock_with_cancel(&self, cancel: &CancelFlag) -> Result<MutexGuard<'_, R, S>> {
        self.acquire_with_cancel(cancel)?;
        Ok(MutexGuard::new(self))
    }

    /// Delete the lock file.
    ///
    /// Ownership is not checked. Releasing a lock that is not held is a no-op.
    pub fn release(&self) -> Result<()> {
        let path = self.lock_path();

        match self.store.delete(&path) {
            Ok(()) => {
                debug!(key = %self.key, "lock released");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(key = %self.key, "lock already released");
                Ok(())
            }
            Err(e) => Err(MutexError::io(
                format!("failed to delete lock file '{}'", path.display()),
                e,
            )),
        }
    }

    /// Process currently recorded as holder, if the lock file exists and
    /// names one.
    pub fn holder(&self) -> Result<Option<Pid>> {
        match self.read_holder(&self.lock_path())? {
            Holder::Pid(pid) => Ok(Some(pid)),
            Holder::Absent | Holder::Garbled(_) => Ok(None),
        }
    }

    /// Whether the lock file exists, regardless of who holds it.
    pub fn is_locked(&self) -> bool {
        self.store.exists(&self.lock_path())
    }

    fn read_holder(&self, path: &Path) -> Result<Holder> {
        match self.store.read_text(path) {
            Ok(content) => Ok(match content.parse::<Pid>() {
                Ok(pid) => Holder::Pid(pid),
                Err(_) => Holder::Garbled(content),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Holder::Absent),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                Ok(Holder::Garbled("<non-UTF-8 content>".to_string()))
            }
            Err(e) => Err(MutexError::io(
                format!("failed to read lock file '{}'", path.display()),
                e,
            )),
        }
    }

    /// Claim a free lock. Returns `false` if another process got there first.
    fn publish(&self, path: &Path, me: Pid) -> Result<bool> {
        match self.store.create_new_text(path, &me.to_string()) {
            Ok(()) => {
                debug!(key = %self.key, pid = %me, "lock acquired");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!(key = %self.key, "lost race for free lock");
                Ok(false)
            }
            Err(e) => Err(MutexError::io(
                format!("failed to write lock file '{}'", path.display()),
                e,
            )),
        }
    }

    /// Sleep for `duration`, failing with `Cancelled` if `cancel` is set.
    fn pause(&self, cancel: &CancelFlag, duration: Duration) -> Result<()> {
        if cancel.sleep(duration) {
            return Ok(());
        }
        debug!(key = %self.key, "wait cancelled");
        Err(MutexError::Cancelled(self.key.to_string()))
    }

    /// Replace a stale holder.
    fn overwrite(&self, path: &Path, me: Pid) -> Result<()> {
        self.store.write_text(path, &me.to_string()).map_err(|e| {
            MutexError::io(
                format!("failed to overwrite lock file '{}'", path.display()),
                e,
            )
        })
    }
}
