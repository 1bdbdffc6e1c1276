//! Diagnostics for the `babysteps` binary.
//!
//! The library only emits `tracing` events; an embedding app installs
//! whatever subscriber it likes. The CLI calls [`init_logging`], which
//! writes to stderr so `babysteps export` can pipe snapshot JSON on stdout.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How chatty the CLI is, chosen by `-q` and repeated `-v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Warnings about absorbed storage failures, plus progress notes.
    #[default]
    Normal,
    /// Store and session lifecycle.
    Verbose,
    /// Per-record detail, including debounce timing.
    Trace,
}

impl Verbosity {
    /// Pick a level from the CLI flags. `quiet` beats any number of `-v`.
    #[must_use]
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// The most detailed level that gets through.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter directive limited to this crate, e.g. `babysteps=debug`.
    #[must_use]
    pub fn directive(self) -> String {
        format!(
            "{}={}",
            env!("CARGO_CRATE_NAME"),
            self.level().as_str().to_ascii_lowercase()
        )
    }
}

/// Install the stderr subscriber for the CLI.
///
/// `RUST_LOG`, when set and valid, replaces the directive derived from
/// `verbosity`. A second call is a no-op.
///
/// ```no_run
/// use babysteps::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(1, false));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
