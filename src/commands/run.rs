//! Implementation of the `fsmutex run` command.

use crate::cli::RunArgs;
use fsmutex::config::Settings;
use fsmutex::error::{MutexError, Result};
use fsmutex::exit_codes;
use fsmutex::mutex::{CancelFlag, FileMutex};
use std::process::Command;
use tracing::{debug, error, info};

/// Execute the `fsmutex run` command.
///
/// Ctrl-C while waiting abandons the wait. Once the child is running, Ctrl-C
/// reaches the child directly and the lock is released after it exits.
/// A child killed by a signal maps to [`exit_codes::USER_ERROR`].
pub fn cmd_run(mut settings: Settings, args: RunArgs) -> Result<i32> {
    if let Some(max_wait_ms) = args.max_wait_ms {
        settings.max_wait_ms = max_wait_ms;
    }

    let (program, program_args) = args
        .command
        .split_first()
        .ok_or_else(|| MutexError::User("no command given".to_string()))?;

    let mutex = FileMutex::new(args.key, settings)?;

    let cancel = CancelFlag::new();
    ctrlc::set_handler({
        let cancel = cancel.clone();

        move || {
            info!("Cancellation requested by user.");
            cancel.cancel();
        }
    })
    .unwrap_or_else(|err| error!("Error setting Ctrl-C handler: {}", err));

    let guard = mutex.lock_with_cancel(&cancel)?;
    debug!(key = %mutex.key(), program = %program, "lock held, starting command");

    let status = Command::new(program).args(program_args).status();

    // Release before reporting a spawn failure so the lock never outlives us.
    guard.release()?;

    let status = status.map_err(|e| {
        MutexError::User(format!("failed to run '{}': {}", program, e))
    })?;

    Ok(status.code().unwrap_or(exit_codes::USER_ERROR))
}
