//! Implementation of the `fsmutex release` command.

use crate::cli::ReleaseArgs;
use fsmutex::config::Settings;
use fsmutex::error::{MutexError, Result};
use fsmutex::mutex::FileMutex;
use tracing::warn;

/// Execute the `fsmutex release` command.
pub fn cmd_release(settings: Settings, args: ReleaseArgs) -> Result<()> {
    // Require --force flag
    if !args.force {
        return Err(MutexError::User(format!(
            "refusing to release lock without --force flag.\n\n\
             Releasing a lock whose holder is still running lets two processes in at once.\n\
             Only release locks if you are certain the holder is gone.\n\n\
             To release the lock, run:\n  fsmutex release {} --force",
            args.key
        )));
    }

    let mutex = FileMutex::new(args.key, settings)?;

    match mutex.info()? {
        Some(info) if info.alive => {
            warn!(key = %info.key, holder = ?info.holder, "releasing lock held by a running process");
        }
        Some(_) => {}
        None => {
            println!("{}: already free", mutex.key());
            return Ok(());
        }
    }

    mutex.release()?;
    println!("{}: released", mutex.key());

    Ok(())
}
