//! fsmutex: cross-process mutual exclusion backed by pid lock files.
//!
//! Processes on one host that share a filesystem serialize access to a named
//! resource through [`mutex::FileMutex`]:
//!
//! ```no_run
//! use fsmutex::config::Settings;
//! use fsmutex::mutex::FileMutex;
//!
//! let mutex = FileMutex::new("db-migrate", Settings::for_environment("production"))?;
//! let guard = mutex.lock()?;
//! // ... protected work ...
//! guard.release()?;
//! # Ok::<(), fsmutex::error::MutexError>(())
//! ```

pub mod config;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod mutex;
pub mod process;

#[cfg(test)]
pub(crate) mod test_support;
