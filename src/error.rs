//! Error types for `sipcmd`
//!
//! Dispatch failures are never fatal to the process: the dispatcher logs them
//! and returns. They are still typed so that callers needing an outcome (the
//! `exec` subcommand, tests) can match on the reason.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `sipcmd` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// The input was rejected by the dispatcher
    pub const DISPATCH_ERROR: i32 = 4;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `sipcmd` operations.
#[derive(Debug, Error)]
pub enum SipCmdError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Input rejected by the dispatcher
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Invalid command-line usage not caught by the argument parser
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SipCmdError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => ExitCode::CONFIG_ERROR,
            Self::Dispatch(_) => ExitCode::DISPATCH_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
            Self::Json(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Configuration file exceeds the size limit
    #[error("config file {path} is {size} bytes (limit: {limit})")]
    TooLarge {
        /// Path to the configuration file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

// ============================================================================
// Dispatch Errors
// ============================================================================

/// Reasons a dispatch attempt was aborted before any handler ran.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No command name could be read from the start of the input
    #[error("unable to parse function name of command: `{input}`")]
    UnparseableInput {
        /// The raw input
        input: String,
    },

    /// The parsed command name is not registered
    #[error("this command doesn't exist: `{name}`{}", suggestion_suffix(.suggestion.as_deref()))]
    UnknownCommand {
        /// The parsed command name
        name: String,
        /// Closest registered name, if one is near enough
        suggestion: Option<String>,
    },

    /// A `key=value` pair used a key the command does not declare
    #[error("command with invalid argument: `{command} ({argument})`")]
    UnknownArgument {
        /// The resolved command name
        command: String,
        /// The undeclared key
        argument: String,
    },

    /// A valueless token appeared while bare tokens are rejected
    #[error("command with valueless argument: `{command} ({token})`")]
    BareToken {
        /// The resolved command name
        command: String,
        /// The offending token
        token: String,
    },

    /// A required argument has no value at execution time
    #[error("missing argument for command: `{command} ({argument})`")]
    MissingArgument {
        /// The command being executed
        command: String,
        /// Name of the missing argument
        argument: String,
    },

    /// The method carried by an address is empty or not registered
    #[error("method unknown: `{method}`")]
    UnknownMethod {
        /// The method name (empty when no method and no default applied)
        method: String,
    },

    /// The address scheme is neither the primary nor the alias scheme
    #[error("bad uri protocol, different from {primary} or {alias}: `{scheme}`")]
    UnsupportedScheme {
        /// The scheme found on the input
        scheme: String,
        /// Configured primary scheme
        primary: String,
        /// Configured alias scheme
        alias: String,
    },

    /// A handler dispatched into the dispatcher that is running it
    #[error("nested dispatch from inside a handler: `{input}`")]
    Reentrant {
        /// The nested input
        input: String,
    },
}

impl DispatchError {
    /// Short stable label used for metrics and events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnparseableInput { .. } => "unparseable_input",
            Self::UnknownCommand { .. } => "unknown_command",
            Self::UnknownArgument { .. } => "unknown_argument",
            Self::BareToken { .. } => "bare_token",
            Self::MissingArgument { .. } => "missing_argument",
            Self::UnknownMethod { .. } => "unknown_method",
            Self::UnsupportedScheme { .. } => "unsupported_scheme",
            Self::Reentrant { .. } => "reentrant_dispatch",
        }
    }
}

fn suggestion_suffix(suggestion: Option<&str>) -> String {
    suggestion.map_or_else(String::new, |s| format!(" (did you mean `{s}`?)"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::SUCCESS, 0);
        assert_eq!(ExitCode::ERROR, 1);
        assert_eq!(ExitCode::CONFIG_ERROR, 2);
        assert_eq!(ExitCode::IO_ERROR, 3);
        assert_eq!(ExitCode::DISPATCH_ERROR, 4);
        assert_eq!(ExitCode::USAGE_ERROR, 64);
        assert_eq!(ExitCode::INTERRUPTED, 130);
        assert_eq!(ExitCode::TERMINATED, 143);
    }

    #[test]
    fn test_dispatch_error_exit_code() {
        let err: SipCmdError = DispatchError::UnknownMethod {
            method: "dance".to_string(),
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::DISPATCH_ERROR);
    }

    #[test]
    fn test_config_error_exit_code() {
        let err: SipCmdError = ConfigError::MissingFile {
            path: PathBuf::from("/test"),
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn test_yaml_parse_error_is_config_error() {
        let err: SipCmdError = ConfigError::ParseError {
            path: PathBuf::from("sipcmd.yaml"),
            line: Some(1),
            message: "did not find expected node content".to_string(),
        }
        .into();
        assert!(matches!(err, SipCmdError::Config(_)));
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn test_io_error_exit_code() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: SipCmdError = io_err.into();
        assert_eq!(err.exit_code(), ExitCode::IO_ERROR);
    }

    #[test]
    fn test_usage_error_exit_code() {
        let err = SipCmdError::Usage("empty input".to_string());
        assert_eq!(err.exit_code(), ExitCode::USAGE_ERROR);
    }

    #[test]
    fn test_unknown_command_display_with_suggestion() {
        let err = DispatchError::UnknownCommand {
            name: "cal".to_string(),
            suggestion: Some("call".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "this command doesn't exist: `cal` (did you mean `call`?)"
        );
    }

    #[test]
    fn test_unknown_command_display_without_suggestion() {
        let err = DispatchError::UnknownCommand {
            name: "zzz".to_string(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "this command doesn't exist: `zzz`");
    }

    #[test]
    fn test_unsupported_scheme_names_scheme() {
        let err = DispatchError::UnsupportedScheme {
            scheme: "tel".to_string(),
            primary: "sip".to_string(),
            alias: "sip-linphone".to_string(),
        };
        assert!(err.to_string().contains("`tel`"));
        assert_eq!(err.kind(), "unsupported_scheme");
    }

    #[test]
    fn test_reentrant_display() {
        let err = DispatchError::Reentrant {
            input: "show".to_string(),
        };
        assert_eq!(err.to_string(), "nested dispatch from inside a handler: `show`");
        assert_eq!(err.kind(), "reentrant_dispatch");
    }

    #[test]
    fn test_missing_argument_display() {
        let err = DispatchError::MissingArgument {
            command: "call".to_string(),
            argument: "sip-address".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "missing argument for command: `call (sip-address)`"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ParseError {
            path: PathBuf::from("sipcmd.yaml"),
            line: Some(3),
            message: "unexpected token".to_string(),
        };
        assert!(err.to_string().contains("sipcmd.yaml"));
        assert!(err.to_string().contains("unexpected token"));
    }
}
