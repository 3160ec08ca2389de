//! Tracing subscriber setup for the command-line tool.
//!
//! The filter comes from `RUST_LOG` when set; otherwise the verbosity flags
//! pick a level. Output goes to stderr so that reports on stdout stay clean.
//! Only the first call installs a subscriber; later calls return its outcome.

use std::io::IsTerminal;
use std::sync::OnceLock;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

static INSTALLED: OnceLock<Result<(), String>> = OnceLock::new();

/// Verbosity requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Warnings and errors only.
    Quiet,

    /// Progress messages.
    #[default]
    Normal,

    /// Per-step numerical detail.
    Verbose,

    /// Everything, including model internals.
    Trace,
}

impl Verbosity {
    /// Map `-v` / `-q` counts onto a verbosity.
    pub fn from_counts(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Trace,
        }
    }

    fn directive(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Verbose => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Configures the global tracing subscriber once per process.
pub fn init_tracing(verbosity: Verbosity) -> Result<(), InitError> {
    INSTALLED
        .get_or_init(|| install(verbosity))
        .clone()
        .map_err(InitError::Install)
}

fn install(verbosity: Verbosity) -> Result<(), String> {
    let ansi = std::io::stderr().is_terminal();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(std::io::stderr);

    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| e.to_string())
}

/// Errors emitted when configuring the tracing subscriber.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("failed to install the tracing subscriber: {0}")]
    Install(String),
}
