//! Dispatcher configuration.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the stock behavior: `sip` / `sip-linphone` schemes, `call` as the method
//! for addresses without one, and valueless tokens ignored.

pub mod loader;

use serde::{Deserialize, Serialize};

pub use loader::{ConfigLoader, LoaderOptions};

/// Default primary address scheme.
pub const DEFAULT_PRIMARY_SCHEME: &str = "sip";

/// Default alias address scheme.
pub const DEFAULT_ALIAS_SCHEME: &str = "sip-linphone";

/// Default command for addresses carrying no `method` header.
pub const DEFAULT_METHOD: &str = "call";

/// Settings consulted by the classifier and tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Scheme that marks input as an address.
    pub primary_scheme: String,

    /// Second scheme accepted as an address.
    pub alias_scheme: String,

    /// Command used when an address has an empty `method` header.
    /// `None` turns an empty method into an unknown-method failure.
    pub default_method: Option<String>,

    /// What to do with tokens that are not `key=value` pairs.
    pub bare_tokens: BareTokenPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            primary_scheme: DEFAULT_PRIMARY_SCHEME.to_string(),
            alias_scheme: DEFAULT_ALIAS_SCHEME.to_string(),
            default_method: Some(DEFAULT_METHOD.to_string()),
            bare_tokens: BareTokenPolicy::default(),
        }
    }
}

impl DispatchConfig {
    /// Returns `true` if `scheme` is the primary or alias scheme.
    ///
    /// Comparison is ASCII case-insensitive, matching URI scheme rules.
    #[must_use]
    pub fn recognizes(&self, scheme: &str) -> bool {
        scheme.eq_ignore_ascii_case(&self.primary_scheme)
            || scheme.eq_ignore_ascii_case(&self.alias_scheme)
    }
}

/// Handling of valueless tokens in plain command lines, e.g. `toto` in
/// `call toto sip-address=...`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BareTokenPolicy {
    /// Skip the token and keep parsing.
    #[default]
    Ignore,
    /// Abort the parse.
    Reject,
}

impl std::str::FromStr for BareTokenPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown bare token policy '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DispatchConfig::default();
        assert_eq!(config.primary_scheme, "sip");
        assert_eq!(config.alias_scheme, "sip-linphone");
        assert_eq!(config.default_method.as_deref(), Some("call"));
        assert_eq!(config.bare_tokens, BareTokenPolicy::Ignore);
    }

    #[test]
    fn test_recognizes_both_schemes() {
        let config = DispatchConfig::default();
        assert!(config.recognizes("sip"));
        assert!(config.recognizes("SIP"));
        assert!(config.recognizes("sip-linphone"));
        assert!(!config.recognizes("tel"));
        assert!(!config.recognizes(""));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: DispatchConfig = serde_yaml::from_str("bare_tokens: reject\n").unwrap();
        assert_eq!(config.bare_tokens, BareTokenPolicy::Reject);
        assert_eq!(config.primary_scheme, "sip");
    }

    #[test]
    fn test_null_default_method() {
        let config: DispatchConfig = serde_yaml::from_str("default_method: null\n").unwrap();
        assert_eq!(config.default_method, None);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<DispatchConfig, _> = serde_yaml::from_str("schemes: [sip]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_bare_token_policy_from_str() {
        assert_eq!("ignore".parse(), Ok(BareTokenPolicy::Ignore));
        assert_eq!(" Reject ".parse(), Ok(BareTokenPolicy::Reject));
        assert!("flag".parse::<BareTokenPolicy>().is_err());
    }
}
