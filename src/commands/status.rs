//! Implementation of the `fsmutex status` command.

use crate::cli::StatusArgs;
use fsmutex::config::Settings;
use fsmutex::error::{MutexError, Result};
use fsmutex::mutex::FileMutex;
use serde_json::json;

/// Execute the `fsmutex status` command.
pub fn cmd_status(settings: Settings, args: StatusArgs) -> Result<()> {
    let mutex = FileMutex::new(args.key, settings)?;
    let info = mutex.info()?;

    if args.json {
        let value = match &info {
            Some(info) => serde_json::to_value(info)
                .map_err(|e| MutexError::User(format!("failed to serialize status: {}", e)))?,
            None => json!({
                "key": mutex.key().as_str(),
                "path": mutex.lock_path(),
                "holder": null,
            }),
        };
        println!("{}", value);
        return Ok(());
    }

    let Some(info) = info else {
        println!("{}: free", mutex.key());
        return Ok(());
    };

    println!("{}:", info.key);
    match info.holder {
        Some(pid) => println!("  PID:        {}", pid),
        None => println!("  PID:        (unreadable)"),
    }
    println!(
        "  Status:     {}",
        if info.alive { "held" } else { "STALE (holder not running)" }
    );
    if let Some(modified) = info.modified {
        println!("  Written:    {}", modified.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    println!("  Age:        {}", info.age_string());
    println!("  Path:       {}", info.path.display());

    Ok(())
}
