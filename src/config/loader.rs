//! Configuration loader.
//!
//! Pipeline:
//! 1. Size check against [`LoaderOptions::max_config_size`]
//! 2. YAML parsing into [`DispatchConfig`] (missing fields take defaults)
//! 3. Environment overrides (`SIPCMD_DEFAULT_METHOD`, `SIPCMD_BARE_TOKENS`)
//! 4. Validation

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{BareTokenPolicy, DispatchConfig};
use crate::error::ConfigError;
use crate::parser::tokenizer::is_identifier;

/// Environment variable overriding [`DispatchConfig::default_method`].
/// An empty value disables the fallback.
pub const ENV_DEFAULT_METHOD: &str = "SIPCMD_DEFAULT_METHOD";

/// Environment variable overriding [`DispatchConfig::bare_tokens`].
pub const ENV_BARE_TOKENS: &str = "SIPCMD_BARE_TOKENS";

/// Options for the configuration loader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Maximum configuration file size in bytes.
    pub max_config_size: u64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            max_config_size: env_or("SIPCMD_MAX_CONFIG_SIZE", 1024 * 1024),
        }
    }
}

/// Configuration loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a new configuration loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a new configuration loader with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(LoaderOptions::default())
    }

    /// Resolves the effective configuration: the file at `path` when given,
    /// defaults otherwise, then process environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting configuration is invalid.
    pub fn resolve(&self, path: Option<&Path>) -> Result<DispatchConfig, ConfigError> {
        let config = match path {
            Some(path) => self.load_file(path)?,
            None => DispatchConfig::default(),
        };
        let config = apply_overrides(config, |name| std::env::var(name).ok())?;
        validate(&config)?;
        Ok(config)
    }

    /// Loads and validates a configuration file without environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist or exceeds the size limit
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load_file(&self, path: &Path) -> Result<DispatchConfig, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        if metadata.len() > self.options.max_config_size {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: self.options.max_config_size,
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let config = parse_str(&raw, path)?;
        validate(&config)?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

/// Parses YAML text into a configuration.
///
/// An empty document yields the defaults.
///
/// # Errors
///
/// Returns [`ConfigError::ParseError`] for malformed YAML or unknown fields.
pub fn parse_str(raw: &str, path: &Path) -> Result<DispatchConfig, ConfigError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    if raw.trim().is_empty() {
        return Ok(DispatchConfig::default());
    }

    serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        line: e.location().map(|l| l.line()),
        message: e.to_string(),
    })
}

/// Applies environment overrides read through `lookup`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when an override cannot be parsed.
pub fn apply_overrides<F>(mut config: DispatchConfig, lookup: F) -> Result<DispatchConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_DEFAULT_METHOD) {
        let value = value.trim();
        config.default_method = (!value.is_empty()).then(|| value.to_string());
    }

    if let Some(value) = lookup(ENV_BARE_TOKENS) {
        config.bare_tokens =
            value
                .parse::<BareTokenPolicy>()
                .map_err(|_| ConfigError::InvalidValue {
                    field: ENV_BARE_TOKENS.to_string(),
                    value: value.clone(),
                    expected: "'ignore' or 'reject'".to_string(),
                })?;
    }

    Ok(config)
}

/// Checks scheme names and the default method.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for the first invalid field.
pub fn validate(config: &DispatchConfig) -> Result<(), ConfigError> {
    for (field, scheme) in [
        ("primary_scheme", &config.primary_scheme),
        ("alias_scheme", &config.alias_scheme),
    ] {
        if !is_scheme_name(scheme) {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                value: scheme.clone(),
                expected: "a URI scheme (letter followed by letters, digits, '+', '-' or '.')"
                    .to_string(),
            });
        }
    }

    if config.primary_scheme.eq_ignore_ascii_case(&config.alias_scheme) {
        return Err(ConfigError::InvalidValue {
            field: "alias_scheme".to_string(),
            value: config.alias_scheme.clone(),
            expected: "a scheme different from primary_scheme".to_string(),
        });
    }

    if let Some(method) = &config.default_method {
        if !is_identifier(method) {
            return Err(ConfigError::InvalidValue {
                field: "default_method".to_string(),
                value: method.clone(),
                expected: "a command name (word characters or '-')".to_string(),
            });
        }
    }

    Ok(())
}

fn is_scheme_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Path used in error messages for configuration that did not come from a
/// file.
#[must_use]
pub fn inline_path() -> PathBuf {
    PathBuf::from("<inline>")
}

// ============================================================================
// Tests
// ============================================================================
