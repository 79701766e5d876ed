//! Structured address resolution.
//!
//! The dispatcher only needs three things from an address: its scheme, a
//! header lookup by name, and its string form. [`Address`] and
//! [`AddressResolver`] describe that capability; [`SipAddressResolver`] is
//! the built-in implementation for SIP-style URIs such as
//! `sip:alice@example.org?method=call`.

use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use regex::Regex;

/// RFC 3986 scheme followed by `:`.
static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*):(.*)$").expect("valid regex"));

/// A parsed address-like value.
pub trait Address: fmt::Debug {
    /// Lowercased scheme, empty when the address has none.
    fn scheme(&self) -> &str;

    /// Value of the header called exactly `name`, if present.
    fn header(&self, name: &str) -> Option<&str>;

    /// String form of the address.
    fn as_str(&self) -> &str;
}

/// Resolves raw input into an [`Address`].
///
/// Returning `None` means the input is not an address; it is not an error.
pub trait AddressResolver: Send + Sync {
    /// Attempts to interpret `input` as an address.
    fn resolve(&self, input: &str) -> Option<Box<dyn Address>>;
}

/// Returns the header value, treating an absent header as empty.
#[must_use]
pub fn header_or_empty<'a>(address: &'a dyn Address, name: &str) -> &'a str {
    address.header(name).unwrap_or_default()
}

// ============================================================================
// SIP addresses
// ============================================================================

/// A SIP-style URI: `scheme:target[;param=value]*[?header=value[&header=value]*]`.
///
/// Both `;` URI parameters and `?` URI headers are exposed through
/// [`Address::header`]; on a name clash the `?` header wins. Names and values
/// are percent-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SipAddress {
    raw: String,
    scheme: String,
    target: String,
    headers: IndexMap<String, String>,
}

impl SipAddress {
    /// Parses `input` as a SIP-style URI.
    ///
    /// Returns `None` when the input is empty, contains whitespace, does
    /// not start with a scheme, or names no target after the scheme.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let raw = input.trim();
        if raw.is_empty() || raw.chars().any(char::is_whitespace) {
            return None;
        }

        let caps = SCHEME_RE.captures(raw)?;
        let scheme = caps[1].to_ascii_lowercase();
        let rest = caps.get(2).map_or("", |m| m.as_str());

        let (address_part, query) = match rest.split_once('?') {
            Some((address_part, query)) => (address_part, Some(query)),
            None => (rest, None),
        };

        let mut params = address_part.split(';');
        let target = params.next().unwrap_or_default().to_string();
        if target.is_empty() {
            return None;
        }

        let mut headers = IndexMap::new();
        for param in params {
            insert_pair(&mut headers, param);
        }
        if let Some(query) = query {
            for header in query.split('&') {
                insert_pair(&mut headers, header);
            }
        }

        Some(Self {
            raw: raw.to_string(),
            scheme,
            target,
            headers,
        })
    }

    /// The part between the scheme and the first parameter or header,
    /// e.g. `alice@example.org`.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// All headers and parameters, in the order they appeared.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Address for SipAddress {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for SipAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn insert_pair(headers: &mut IndexMap<String, String>, pair: &str) {
    if pair.is_empty() {
        return;
    }
    let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
    let name = decode(name);
    if name.is_empty() {
        return;
    }
    // later occurrences win, so `?` headers override `;` params
    headers.insert(name, decode(value));
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Built-in resolver producing [`SipAddress`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct SipAddressResolver;

impl AddressResolver for SipAddressResolver {
    fn resolve(&self, input: &str) -> Option<Box<dyn Address>> {
        SipAddress::parse(input).map(|address| Box::new(address) as Box<dyn Address>)
    }
}
