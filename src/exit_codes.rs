//! Exit code constants for the fsmutex CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, bad key, bad config)
//! - 3: Filesystem failure
//! - 4: Lock acquisition failure (timeout or cancelled)
//!
//! `fsmutex run` exits with the child's own code when the child ran.

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid key, or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// Filesystem failure: lock directory or lock file could not be managed.
pub const IO_FAILURE: i32 = 3;

/// Lock acquisition failure: the holder stayed alive or the wait was cancelled.
pub const LOCK_FAILURE: i32 = 4;
