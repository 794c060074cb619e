//! Read-only views of lock files for status reporting.

use super::key::is_safe_segment;
use super::operations::FileMutex;
use crate::config::Settings;
use crate::error::{MutexError, Result};
use crate::fs::FileStore;
use crate::process::{Pid, ProcessRegistry};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// Information about one lock file.
#[derive(Debug, Clone, Serialize)]
pub struct LockInfo {
    /// The lock key (file name).
    pub key: String,

    /// The lock file path.
    pub path: PathBuf,

    /// Recorded holder, if the content parses as a process id.
    pub holder: Option<Pid>,

    /// Whether the recorded holder is running.
    pub alive: bool,

    /// When the lock file was last written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl LockInfo {
    /// A lock is stale when no running process backs it.
    pub fn is_stale(&self) -> bool {
        !self.alive
    }

    pub fn age(&self) -> Option<Duration> {
        self.modified
            .map(|modified| Utc::now().signed_duration_since(modified))
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> String {
        let Some(age) = self.age() else {
            return "unknown".to_string();
        };
        let seconds = age.num_seconds();
        let minutes = age.num_minutes();
        let hours = age.num_hours();
        let days = age.num_days();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else if minutes > 0 {
            format!("{}m", minutes)
        } else {
            format!("{}s", seconds.max(0))
        }
    }

    /// Build from a lock file path; `Ok(None)` if the file is gone.
    fn read<R: ProcessRegistry, S: FileStore>(
        key: &str,
        path: &Path,
        registry: &R,
        store: &S,
    ) -> Result<Option<Self>> {
        let holder = match store.read_text(path) {
            Ok(content) => content.parse::<Pid>().ok(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => None,
            Err(e) => {
                return Err(MutexError::io(
                    format!("failed to read lock file '{}'", path.display()),
                    e,
                ));
            }
        };

        let alive = holder.is_some_and(|pid| registry.process_exists(pid));
        let modified = store.modified(path).ok().map(DateTime::<Utc>::from);

        Ok(Some(Self {
            key: key.to_string(),
            path: path.to_path_buf(),
            holder,
            alive,
            modified,
        }))
    }
}

impl std::fmt::Display for LockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let holder = self
            .holder
            .map(|pid| pid.to_string())
            .unwrap_or_else(|| "?".to_string());
        write!(
            f,
            "{} (pid: {}, age: {}{})",
            self.key,
            holder,
            self.age_string(),
            if self.is_stale() { ", STALE" } else { "" }
        )
    }
}

impl<R: ProcessRegistry, S: FileStore> FileMutex<R, S> {
    /// Status of this mutex's lock file, `None` when the lock is free.
    pub fn info(&self) -> Result<Option<LockInfo>> {
        LockInfo::read(
            self.key().as_str(),
            &self.lock_path(),
            self.registry(),
            self.store(),
        )
    }
}

/// List every lock file in the environment's lock directory, sorted by key.
///
/// A missing lock directory means no locks. Staging files and names that
/// are not valid keys are skipped.
pub fn list_locks<R: ProcessRegistry, S: FileStore>(
    settings: &Settings,
    registry: &R,
    store: &S,
) -> Result<Vec<LockInfo>> {
    let dir = settings.lock_dir();

    let names = match store.list_files(&dir) {
        Ok(names) => names,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(MutexError::io(
                format!("failed to read lock directory '{}'", dir.display()),
                e,
            ));
        }
    };

    let mut locks = Vec::new();
    for name in names.iter().filter(|name| is_safe_segment(name)) {
        // Released between listing and reading.
        if let Some(info) = LockInfo::read(name, &dir.join(name), registry, store)? {
            locks.push(info);
        }
    }

    locks.sort_by(|a, b| a.key.cmp(&b.key));

    Ok(locks)
}
