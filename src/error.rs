//! Error types for fsmutex.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use crate::process::Pid;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Main error type for fsmutex operations.
///
/// Each variant maps to a specific exit code used by the CLI.
#[derive(Error, Debug)]
pub enum MutexError {
    /// The wait budget ran out and the recorded holder is still alive.
    #[error(
        "failed to acquire lock '{key}' after {} ms (held by pid {holder})",
        .elapsed.as_millis()
    )]
    LockTimeout {
        key: String,
        elapsed: Duration,
        holder: Pid,
    },

    /// An unexpected filesystem failure.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The lock key cannot be used as a single path segment.
    #[error("invalid lock key '{0}': use ASCII letters, digits, '.', '_' or '-'")]
    InvalidKey(String),

    /// Configuration failed to load or validate.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A pending acquisition was abandoned through its cancel flag.
    #[error("acquisition of lock '{0}' was cancelled")]
    Cancelled(String),

    /// User provided invalid arguments or the system is in an invalid state.
    #[error("{0}")]
    User(String),
}

impl MutexError {
    /// Wrap an I/O error with a short description of what was attempted.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        MutexError::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            MutexError::LockTimeout { .. } => exit_codes::LOCK_FAILURE,
            MutexError::Cancelled(_) => exit_codes::LOCK_FAILURE,
            MutexError::Io { .. } => exit_codes::IO_FAILURE,
            MutexError::InvalidKey(_) => exit_codes::USER_ERROR,
            MutexError::Config(_) => exit_codes::USER_ERROR,
            MutexError::User(_) => exit_codes::USER_ERROR,
        }
    }
}

/// Result type alias for fsmutex operations.
pub type Result<T> = std::result::Result<T, MutexError>;
