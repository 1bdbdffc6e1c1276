//! Command-line interface for babysteps.
//!
//! This module provides the CLI structure for the `babysteps` maintenance
//! binary, which inspects and repairs the local store outside the app.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{
    ConfigCommand, ExportCommand, ImportCommand, PinCommand, StatusCommand, WipeCommand,
};

/// babysteps - Inspect and maintain the local baby journal store
///
/// Reads and writes the same database and flags the app uses, so stop the
/// app before importing or wiping.
#[derive(Debug, Parser)]
#[command(name = "babysteps")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show store locations, flags and a summary of the stored snapshot
    Status(StatusCommand),

    /// Decode the stored snapshot and print it as JSON
    Export(ExportCommand),

    /// Replace the stored snapshot with one read from a JSON file
    Import(ImportCommand),

    /// Manage the PIN
    #[command(subcommand)]
    Pin(PinCommand),

    /// Delete the PIN, the launch flag and all stored data
    Wipe(WipeCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args.iter().copied()).unwrap()
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
        assert_eq!(Cli::command().get_name(), "babysteps");
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(parse(&["babysteps", "status"]).verbosity(), Verbosity::Normal);
        assert_eq!(
            parse(&["babysteps", "-v", "status"]).verbosity(),
            Verbosity::Verbose
        );
        assert_eq!(
            parse(&["babysteps", "-vv", "status"]).verbosity(),
            Verbosity::Trace
        );
        assert_eq!(
            parse(&["babysteps", "-q", "-v", "status"]).verbosity(),
            Verbosity::Quiet
        );
    }

    #[test]
    fn test_parse_status_json() {
        let cli = parse(&["babysteps", "status", "--json"]);
        assert!(matches!(cli.command, Command::Status(StatusCommand { json: true })));
    }

    #[test]
    fn test_parse_export_output() {
        let cli = parse(&["babysteps", "export", "-o", "backup.json"]);
        let Command::Export(cmd) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(cmd.output, Some(PathBuf::from("backup.json")));
    }

    #[test]
    fn test_parse_import_requires_file() {
        assert!(Cli::try_parse_from(["babysteps", "import"]).is_err());
        let cli = parse(&["babysteps", "import", "backup.json"]);
        assert!(matches!(cli.command, Command::Import(_)));
    }

    #[test]
    fn test_parse_pin_commands() {
        let cli = parse(&["babysteps", "pin", "set", "1234"]);
        assert!(matches!(
            cli.command,
            Command::Pin(PinCommand::Set { ref pin }) if pin == "1234"
        ));
        let cli = parse(&["babysteps", "pin", "remove"]);
        assert!(matches!(cli.command, Command::Pin(PinCommand::Remove)));
    }

    #[test]
    fn test_parse_wipe() {
        let cli = parse(&["babysteps", "wipe"]);
        assert!(matches!(cli.command, Command::Wipe(WipeCommand { yes: false })));
        let cli = parse(&["babysteps", "wipe", "--yes"]);
        assert!(matches!(cli.command, Command::Wipe(WipeCommand { yes: true })));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["babysteps", "-c", "/custom/config.toml", "config", "show"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: false })
        ));
    }
}
