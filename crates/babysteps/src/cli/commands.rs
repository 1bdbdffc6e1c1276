//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// Snapshot JSON file, as produced by `export`
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Wipe command arguments.
#[derive(Debug, Args)]
pub struct WipeCommand {
    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Credential commands.
#[derive(Debug, Subcommand)]
pub enum PinCommand {
    /// Set or replace the PIN
    Set {
        /// The new PIN
        pin: String,
    },

    /// Check a PIN against the stored one
    Verify {
        /// The PIN to check
        pin: String,
    },

    /// Remove the PIN
    Remove,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
