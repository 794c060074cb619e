use crate::config::Settings;
use crate::fs::{FileStore, LocalFileStore};
use crate::process::{Pid, ProcessRegistry};
use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};

pub(crate) const TEST_MAX_WAIT: Duration = Duration::from_millis(400);
pub(crate) const TEST_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Settings rooted in a test's temp dir with short waits.
pub(crate) fn test_settings(root: &Path) -> Settings {
    Settings {
        root: Some(root.to_path_buf()),
        max_wait_ms: TEST_MAX_WAIT.as_millis() as u64,
        poll_interval_ms: TEST_POLL_INTERVAL.as_millis() as u64,
        ..Settings::for_environment("test")
    }
}

/// Scripted process table: `me` plus an explicit set of live pids.
#[derive(Debug, Clone)]
pub(crate) struct FakeProcesses {
    me: Pid,
    alive: HashSet<Pid>,
}

impl FakeProcesses {
    /// Only `me` is running.
    pub(crate) fn new(me: u32) -> Self {
        Self {
            me: Pid::new(me),
            alive: [Pid::new(me)].into_iter().collect(),
        }
    }

    pub(crate) fn with_alive(mut self, pid: u32) -> Self {
        self.alive.insert(Pid::new(pid));
        self
    }
}

impl ProcessRegistry for FakeProcesses {
    fn current_process_id(&self) -> Pid {
        self.me
    }

    fn process_exists(&self, pid: Pid) -> bool {
        self.alive.contains(&pid)
    }
}

/// Which [`FailingStore`] operation reports an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailOn {
    EnsureDir,
    Read,
    Write,
    Delete,
}

/// Local store with one operation forced to fail with `PermissionDenied`.
#[derive(Debug, Clone)]
pub(crate) struct FailingStore(pub(crate) FailOn);

impl FailingStore {
    fn check(&self, op: FailOn) -> io::Result<()> {
        if self.0 == op {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        }
        Ok(())
    }
}

impl FileStore for FailingStore {
    fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        self.check(FailOn::EnsureDir)?;
        LocalFileStore.ensure_dir(path)
    }

    fn exists(&self, path: &Path) -> bool {
        LocalFileStore.exists(path)
    }

    fn read_text(&self, path: &Path) -> io::Result<String> {
        self.check(FailOn::Read)?;
        LocalFileStore.read_text(path)
    }

    fn write_text(&self, path: &Path, content: &str) -> io::Result<()> {
        self.check(FailOn::Write)?;
        LocalFileStore.write_text(path, content)
    }

    fn create_new_text(&self, path: &Path, content: &str) -> io::Result<()> {
        self.check(FailOn::Write)?;
        LocalFileStore.create_new_text(path, content)
    }

    fn delete(&self, path: &Path) -> io::Result<()> {
        self.check(FailOn::Delete)?;
        LocalFileStore.delete(path)
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        LocalFileStore.modified(path)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<String>> {
        self.check(FailOn::Read)?;
        LocalFileStore.list_files(dir)
    }
}

/// Local store that misreports the filesystem in scripted ways.
#[derive(Debug, Default)]
pub(crate) struct ScriptedStore {
    /// `exists` always answers true, even when nothing is there.
    phantom_lock: bool,
    /// Another process that slips its pid in just before our first claim.
    rival: Option<Pid>,
    rival_done: AtomicBool,
}

impl ScriptedStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_phantom_lock(mut self) -> Self {
        self.phantom_lock = true;
        self
    }

    pub(crate) fn with_rival(mut self, pid: u32) -> Self {
        self.rival = Some(Pid::new(pid));
        self
    }
}

impl FileStore for ScriptedStore {
    fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        LocalFileStore.ensure_dir(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.phantom_lock || LocalFileStore.exists(path)
    }

    fn read_text(&self, path: &Path) -> io::Result<String> {
        LocalFileStore.read_text(path)
    }

    fn write_text(&self, path: &Path, content: &str) -> io::Result<()> {
        LocalFileStore.write_text(path, content)
    }

    fn create_new_text(&self, path: &Path, content: &str) -> io::Result<()> {
        if let Some(rival) = self.rival
            && !self.rival_done.swap(true, Ordering::SeqCst)
        {
            LocalFileStore.create_new_text(path, &rival.to_string())?;
        }
        LocalFileStore.create_new_text(path, content)
    }

    fn delete(&self, path: &Path) -> io::Result<()> {
        LocalFileStore.delete(path)
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        LocalFileStore.modified(path)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<String>> {
        LocalFileStore.list_files(dir)
    }
}
