//! Argument schemes.
//!
//! A scheme lists the named arguments a command accepts and whether each one
//! is optional. It carries no behavior beyond membership and optionality
//! queries.

use indexmap::IndexMap;
use serde::Serialize;

/// A single declared argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Argument {
    /// When `false`, the argument must be present before the handler runs.
    pub optional: bool,
}

impl Argument {
    /// A required argument.
    #[must_use]
    pub const fn required() -> Self {
        Self { optional: false }
    }

    /// An optional argument.
    #[must_use]
    pub const fn optional() -> Self {
        Self { optional: true }
    }
}

/// The set of arguments a command declares.
///
/// Entries keep declaration order so listings are stable; lookups are by
/// exact name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ArgumentScheme {
    entries: IndexMap<String, Argument>,
}

impl ArgumentScheme {
    /// An empty scheme: the command accepts no arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a required argument.
    #[must_use]
    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.entries.insert(name.into(), Argument::required());
        self
    }

    /// Declares an optional argument.
    #[must_use]
    pub fn optional(mut self, name: impl Into<String>) -> Self {
        self.entries.insert(name.into(), Argument::optional());
        self
    }

    /// Returns `true` if the scheme declares `name`, whatever its optionality.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the declared entry for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Argument> {
        self.entries.get(name).copied()
    }

    /// Names of the required arguments, in declaration order.
    pub fn required_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, arg)| !arg.optional)
            .map(|(name, _)| name.as_str())
    }

    /// Iterates over `(name, argument)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Argument)> {
        self.entries.iter().map(|(name, arg)| (name.as_str(), *arg))
    }

    /// Number of declared arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no arguments are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Argument)> for ArgumentScheme {
    fn from_iter<I: IntoIterator<Item = (S, Argument)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, arg)| (name.into(), arg))
                .collect(),
        }
    }
}
