//! Process identity and liveness probing.
//!
//! The lock protocol records the holder's process id and later asks whether
//! that process is still running. Both questions go through [`ProcessRegistry`]
//! so the mutex can be exercised against a scripted registry in tests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// An operating-system process id as stored in a lock file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(u32);

impl Pid {
    pub const fn new(raw: u32) -> Self {
        Pid(raw)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses the decimal form written to lock files. Surrounding whitespace is
/// tolerated so files edited by hand (trailing newline) still parse.
impl FromStr for Pid {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(Pid)
    }
}

/// Source of process identity and liveness.
pub trait ProcessRegistry {
    /// Id of the calling process, stable for its lifetime.
    fn current_process_id(&self) -> Pid;

    /// Whether a process with this id is currently running on this host.
    ///
    /// Implementations must not have any effect observable by the target.
    fn process_exists(&self, pid: Pid) -> bool;
}

/// Registry backed by the host operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcesses;

impl ProcessRegistry for SystemProcesses {
    fn current_process_id(&self) -> Pid {
        Pid(std::process::id())
    }

    fn process_exists(&self, pid: Pid) -> bool {
        if pid.0 == 0 {
            return false;
        }
        probe(pid.0)
    }
}

#[cfg(unix)]
fn probe(raw: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(raw) else {
        return false;
    };

    // SAFETY: signal 0 performs only the existence and permission checks,
    // nothing is delivered to the target.
    let rc = unsafe { libc::kill(pid, 0) };
    if rc == 0 {
        return true;
    }

    // EPERM means the process exists but belongs to someone else.
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(windows)]
fn probe(raw: u32) -> bool {
    use windows_sys::Win32::Foundation::{CloseHandle, STILL_ACTIVE};
    use windows_sys::Win32::System::Threading::{
        GetExitCodeProcess, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION,
    };

    // SAFETY: the handle is checked before use and closed before returning.
    unsafe {
        let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, raw);
        if handle == 0 {
            return false;
        }

        let mut code = 0u32;
        let ok = GetExitCodeProcess(handle, &mut code);
        CloseHandle(handle);

        ok != 0 && code == STILL_ACTIVE as u32
    }
}
