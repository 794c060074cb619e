//! Filesystem-backed cross-process mutex.
//!
//! A lock is a file at `{root}/fsmutex-{environment}/{key}` whose content is
//! the decimal process id of the holder. Existence of the file means the lock
//! is held; absence means it is free.
//!
//! # Acquisition
//!
//! [`FileMutex::acquire`] polls for the file to disappear, sleeping one
//! polling interval between checks, for at most the configured max wait.
//! Free locks are claimed with an atomic create-if-absent, so two waiters can
//! never both claim the same free lock.
//!
//! Once the wait budget is spent the holder's pid is probed:
//! - file gone: claim it
//! - holder not running (or content not a pid): overwrite with our pid
//! - holder running: fail with [`MutexError::LockTimeout`](crate::error::MutexError::LockTimeout)
//!
//! Two processes recovering the same stale lock at the same moment both
//! overwrite it and both return success. Liveness is judged by pid only, so a
//! recycled pid looks alive.
//!
//! # Release
//!
//! [`FileMutex::release`] deletes the file without checking ownership and
//! treats an already-missing file as success. [`MutexGuard`] does the same on
//! drop, logging instead of panicking on failure.

mod cancel;
mod guard;
mod inspect;
mod key;
mod operations;


// Re-export public API
pub use cancel::CancelFlag;
pub use guard::MutexGuard;
pub use inspect::{LockInfo, list_locks};
pub use key::{LockKey, is_safe_segment};
pub use operations::FileMutex;
