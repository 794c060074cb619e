//! CLI argument parsing for fsmutex.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// fsmutex: cross-process mutual exclusion backed by pid lock files.
///
/// Each lock is a file in `{root}/fsmutex-{environment}/` holding the pid of
/// the process that owns it. Locks held by processes that have died are
/// taken over automatically.
#[derive(Parser, Debug)]
#[command(name = "fsmutex")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// YAML settings file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Environment name (overrides config and FSMUTEX_ENV).
    #[arg(long = "env", global = true)]
    pub environment: Option<String>,

    /// Parent directory of the lock directory (overrides config and FSMUTEX_ROOT).
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
}

/// Available commands for fsmutex.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a command while holding a lock.
    ///
    /// Waits for the lock like any other holder would, runs the command,
    /// releases the lock and exits with the command's exit code.
    Run(RunArgs),

    /// Show who holds a lock.
    Status(StatusArgs),

    /// List all locks in the environment.
    List(ListArgs),

    /// Delete a lock file regardless of who holds it.
    Release(ReleaseArgs),
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Lock key.
    pub key: String,

    /// Override the configured max wait (milliseconds).
    #[arg(long)]
    pub max_wait_ms: Option<u64>,

    /// Command and arguments to run.
    #[arg(last = true, required = true)]
    pub command: Vec<String>,
}

/// Arguments for the `status` command.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Lock key.
    pub key: String,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `list` command.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `release` command.
#[derive(Parser, Debug)]
pub struct ReleaseArgs {
    /// Lock key.
    pub key: String,

    /// Force deleting the lock (required for safety).
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_run() {
        let cli =
            Cli::try_parse_from(["fsmutex", "run", "jobs", "--", "make", "-j4", "all"]).unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.key, "jobs");
            assert_eq!(args.max_wait_ms, None);
            assert_eq!(args.command, vec!["make", "-j4", "all"]);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_with_max_wait() {
        let cli = Cli::try_parse_from([
            "fsmutex",
            "run",
            "jobs",
            "--max-wait-ms",
            "5000",
            "--",
            "true",
        ])
        .unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.max_wait_ms, Some(5000));
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_requires_command() {
        assert!(Cli::try_parse_from(["fsmutex", "run", "jobs"]).is_err());
    }

    #[test]
    fn parse_status_json() {
        let cli = Cli::try_parse_from(["fsmutex", "status", "jobs", "--json"]).unwrap();
        if let Command::Status(args) = cli.command {
            assert_eq!(args.key, "jobs");
            assert!(args.json);
        } else {
            panic!("Expected Status command");
        }
    }

    #[test]
    fn parse_list() {
        let cli = Cli::try_parse_from(["fsmutex", "list"]).unwrap();
        assert!(matches!(cli.command, Command::List(ListArgs { json: false })));
    }

    #[test]
    fn parse_release() {
        let cli = Cli::try_parse_from(["fsmutex", "release", "jobs", "--force"]).unwrap();
        if let Command::Release(args) = cli.command {
            assert_eq!(args.key, "jobs");
            assert!(args.force);
        } else {
            panic!("Expected Release command");
        }
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "fsmutex", "list", "--env", "staging", "--root", "/srv", "-vv",
        ])
        .unwrap();

        assert_eq!(cli.global.environment.as_deref(), Some("staging"));
        assert_eq!(cli.global.root, Some(PathBuf::from("/srv")));
        assert_eq!(cli.global.verbose, 2);
    }

    #[test]
    fn parse_config_flag() {
        let cli =
            Cli::try_parse_from(["fsmutex", "--config", "fsmutex.yaml", "status", "x"]).unwrap();
        assert_eq!(cli.global.config, Some(PathBuf::from("fsmutex.yaml")));
    }
}
