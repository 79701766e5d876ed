//! CLI argument definitions
//!
//! All Clap derive structs for `sipcmd` command-line parsing.

use std::borrow::Cow;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::observability::LogFormat;
use crate::parser::tokenizer::is_identifier;

// ============================================================================
// Root CLI
// ============================================================================

/// Dispatch plain command lines and SIP-style URIs to registered commands.
#[derive(Parser, Debug)]
#[command(name = "sipcmd", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress diagnostic logging; events are still written.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "SIPCMD_COLOR")]
    pub color: ColorChoice,

    /// Diagnostic log format on stderr.
    #[arg(long, default_value = "human", global = true, env = "SIPCMD_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Path to a YAML dispatch configuration file.
    #[arg(short, long, global = true, env = "SIPCMD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Local account address; conference creation is refused for others.
    #[arg(long, global = true, env = "SIPCMD_IDENTITY")]
    pub identity: Option<String>,

    /// Write the JSONL event stream to this file instead of stdout.
    #[arg(long, global = true, env = "SIPCMD_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dispatch a single command line or address.
    Exec(ExecArgs),

    /// Dispatch every line read from stdin.
    Listen(ListenArgs),

    /// List registered commands and their arguments.
    List(ListArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Arguments for `exec`.
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Input to dispatch; multiple words are joined with single spaces.
    #[arg(required = true, num_args = 1..)]
    pub input: Vec<String>,
}

impl ExecArgs {
    /// The dispatch input as one line.
    ///
    /// A `key=value` word whose value contains whitespace was quoted by the
    /// shell, so its value is re-quoted to survive tokenizing.
    #[must_use]
    pub fn line(&self) -> String {
        self.input
            .iter()
            .map(String::as_str)
            .map(requote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn requote(word: &str) -> Cow<'_, str> {
    if !word.chars().any(char::is_whitespace) {
        return Cow::Borrowed(word);
    }
    let Some((key, value)) = word.split_once('=') else {
        return Cow::Borrowed(word);
    };
    let already_quoted = value.len() >= 2 && value.starts_with('"') && value.ends_with('"');
    if !is_identifier(key) || already_quoted {
        return Cow::Borrowed(word);
    }

    let mut quoted = String::with_capacity(word.len() + 2);
    quoted.push_str(key);
    quoted.push_str("=\"");
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

/// Arguments for `listen`.
#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Expose Prometheus metrics on `127.0.0.1:<port>`.
    #[arg(long, env = "SIPCMD_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for `list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
