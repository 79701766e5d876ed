//! Input classification: address or plain command line.
//!
//! Address detection always runs first. An input carrying a recognized
//! scheme never falls through to plain parsing, and neither does one
//! carrying any other non-empty scheme: that is a hard failure.

use std::fmt;

use tracing::debug;

use crate::address::{Address, AddressResolver, header_or_empty};
use crate::command::{Command, CommandRegistry};
use crate::config::DispatchConfig;
use crate::error::DispatchError;

/// Header naming the command on the address path.
pub const METHOD_HEADER: &str = "method";

/// Outcome of classifying raw input.
pub enum Classification {
    /// The input is an address with a recognized scheme.
    Address(Box<dyn Address>),
    /// The input should be parsed as a plain command line.
    Plain,
}

impl fmt::Debug for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(address) => f.debug_tuple("Address").field(&address.as_str()).finish(),
            Self::Plain => f.write_str("Plain"),
        }
    }
}

/// Decides which grammar applies to `input`.
///
/// # Errors
///
/// Returns [`DispatchError::UnsupportedScheme`] when the input resolves to an
/// address whose non-empty scheme is neither the primary nor the alias scheme.
pub fn classify(
    input: &str,
    resolver: &dyn AddressResolver,
    config: &DispatchConfig,
) -> Result<Classification, DispatchError> {
    let Some(address) = resolver.resolve(input) else {
        return Ok(Classification::Plain);
    };

    let scheme = address.scheme();
    if config.recognizes(scheme) {
        debug!(scheme, address = address.as_str(), "input classified as address");
        return Ok(Classification::Address(address));
    }

    if scheme.is_empty() {
        return Ok(Classification::Plain);
    }

    Err(DispatchError::UnsupportedScheme {
        scheme: scheme.to_string(),
        primary: config.primary_scheme.clone(),
        alias: config.alias_scheme.clone(),
    })
}

/// Resolves the command named by an address's `method` header.
///
/// An empty header falls back to [`DispatchConfig::default_method`].
///
/// # Errors
///
/// Returns [`DispatchError::UnknownMethod`] when the method is empty with no
/// fallback configured, or names an unregistered command.
pub fn resolve_method<'r>(
    address: &dyn Address,
    registry: &'r CommandRegistry,
    config: &DispatchConfig,
) -> Result<&'r Command, DispatchError> {
    let header = header_or_empty(address, METHOD_HEADER);
    let method = if header.is_empty() {
        config.default_method.as_deref().unwrap_or_default()
    } else {
        header
    };

    if method.is_empty() {
        return Err(DispatchError::UnknownMethod {
            method: String::new(),
        });
    }

    registry
        .lookup(method)
        .ok_or_else(|| DispatchError::UnknownMethod {
            method: method.to_string(),
        })
}
