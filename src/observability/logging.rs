//! Diagnostic logging.
//!
//! Dispatch failures, duplicate registrations and tokenizer detail are all
//! `tracing` events; this installs the stderr subscriber that renders them.

use std::io::IsTerminal;

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Overrides the directive derived from `-v` when set.
pub const LOG_LEVEL_ENV: &str = "SIPCMD_LOG_LEVEL";

/// How diagnostics are rendered on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// One readable line per event.
    #[default]
    Human,
    /// Newline-delimited JSON.
    Json,
}

/// Subscriber settings collected from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSettings {
    /// Output rendering.
    pub format: LogFormat,
    /// Count of `-v` flags.
    pub verbosity: u8,
    /// ANSI color choice for the human format.
    pub color: ColorChoice,
}

/// Level directive for a `-v` count; saturates at `trace`.
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Builds the filter: a parseable `override_directive` wins over the
/// verbosity count.
#[must_use]
pub fn build_filter(verbosity: u8, override_directive: Option<&str>) -> EnvFilter {
    override_directive
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(verbosity_to_directive(verbosity)))
}

/// Whether to emit ANSI escapes.
#[must_use]
pub const fn use_ansi(color: ColorChoice, stderr_is_terminal: bool, no_color: bool) -> bool {
    match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => stderr_is_terminal && !no_color,
    }
}

/// Installs the global subscriber on stderr.
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place.
pub fn init_logging(settings: LogSettings) {
    let override_directive = std::env::var(LOG_LEVEL_ENV).ok();
    let filter = build_filter(settings.verbosity, override_directive.as_deref());
    // module paths only help when debugging the parser itself
    let with_target = settings.verbosity >= 2;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(with_target)
        .with_writer(std::io::stderr);

    let _ = match settings.format {
        LogFormat::Human => builder
            .with_ansi(use_ansi(
                settings.color,
                std::io::stderr().is_terminal(),
                std::env::var_os("NO_COLOR").is_some(),
            ))
            .try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
