//! Implementation of the `fsmutex list` command.

use crate::cli::ListArgs;
use fsmutex::config::Settings;
use fsmutex::error::{MutexError, Result};
use fsmutex::fs::LocalFileStore;
use fsmutex::mutex::list_locks;
use fsmutex::process::SystemProcesses;

/// Execute the `fsmutex list` command.
pub fn cmd_list(settings: Settings, args: ListArgs) -> Result<()> {
    let locks = list_locks(&settings, &SystemProcesses, &LocalFileStore)?;

    if args.json {
        let out = serde_json::to_string_pretty(&locks)
            .map_err(|e| MutexError::User(format!("failed to serialize locks: {}", e)))?;
        println!("{}", out);
        return Ok(());
    }

    if locks.is_empty() {
        println!("No active locks in {}.", settings.lock_dir().display());
        return Ok(());
    }

    println!("Active locks ({}):", locks.len());
    println!();
    for lock in &locks {
        println!("  {}", lock);
    }

    let stale_count = locks.iter().filter(|l| l.is_stale()).count();
    if stale_count > 0 {
        println!();
        println!(
            "{} stale lock(s); the next acquirer takes them over, or run `fsmutex release <key> --force`.",
            stale_count
        );
    }

    Ok(())
}
