//! Command implementations for fsmutex.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus settings resolution shared by all of them.

mod list;
mod release;
mod run;
mod status;

use crate::cli::{Command, GlobalArgs};
use fsmutex::config::Settings;
use fsmutex::error::Result;
use fsmutex::exit_codes;

/// Dispatch a command to its implementation.
///
/// Returns the process exit code on success; `run` passes through the
/// child's code.
pub fn dispatch(global: &GlobalArgs, command: Command) -> Result<i32> {
    let settings = resolve_settings(global)?;

    match command {
        Command::Run(args) => run::cmd_run(settings, args),
        Command::Status(args) => status::cmd_status(settings, args).map(|()| exit_codes::SUCCESS),
        Command::List(args) => list::cmd_list(settings, args).map(|()| exit_codes::SUCCESS),
        Command::Release(args) => release::cmd_release(settings, args).map(|()| exit_codes::SUCCESS),
    }
}

/// Build settings from, in increasing precedence: defaults, `--config`
/// file, `FSMUTEX_*` environment variables, command-line flags.
pub fn resolve_settings(global: &GlobalArgs) -> Result<Settings> {
    let mut settings = match &global.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    settings.apply_env_overrides();

    if let Some(environment) = &global.environment {
        settings.environment = environment.clone();
    }
    if let Some(root) = &global.root {
        settings.root = Some(root.clone());
    }

    settings.validate()?;
    Ok(settings)
}
