//! Command registry.
//!
//! Built once by the application before dispatching starts, then moved into
//! the [`Dispatcher`](crate::dispatcher::Dispatcher). There is no global
//! instance.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::observability::metrics;

use super::record::{Command, Handler};
use super::scheme::ArgumentScheme;

/// Maximum edit distance for "did you mean" suggestions.
const SUGGESTION_DISTANCE: usize = 2;

/// Name → command mapping with first-registration-wins semantics.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: IndexMap<String, Command>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command.
    ///
    /// A name that is already registered is left untouched and a warning is
    /// logged. Returns `true` when the command was inserted.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: impl Handler + 'static,
        scheme: ArgumentScheme,
    ) -> bool {
        self.insert(Command::new(name, description, handler, scheme))
    }

    /// Registers a prebuilt command record, with the same duplicate rule as
    /// [`register`](Self::register).
    pub fn insert(&mut self, command: Command) -> bool {
        if self.commands.contains_key(command.name()) {
            warn!(command = command.name(), "command already exists");
            metrics::record_registration(false);
            return false;
        }

        debug!(
            command = command.name(),
            arguments = command.scheme().len(),
            "command registered"
        );
        metrics::record_registration(true);
        self.commands.insert(command.name().to_string(), command);
        true
    }

    /// Looks up a command by exact name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Closest registered name to `name`, if one is within a small edit
    /// distance.
    #[must_use]
    pub fn suggest(&self, name: &str) -> Option<String> {
        self.commands
            .keys()
            .map(|candidate| (candidate, strsim::damerau_levenshtein(name, candidate)))
            .filter(|(_, dist)| *dist <= SUGGESTION_DISTANCE)
            .min_by_key(|(_, dist)| *dist)
            .map(|(candidate, _)| candidate.clone())
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    /// Registered commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::record::Arguments;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn noop(_: &Arguments) {}

    #[test]
    fn test_register_and_lookup() {
        let mut registry = CommandRegistry::new();
        assert!(registry.register("show", "Show the main window", noop, ArgumentScheme::new()));

        let cmd = registry.lookup("show").unwrap();
        assert_eq!(cmd.name(), "show");
        assert_eq!(cmd.description(), "Show the main window");
        assert!(registry.lookup("hide").is_none());
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut registry = CommandRegistry::new();

        let counter = Arc::clone(&first);
        assert!(registry.register(
            "show",
            "first",
            move |_: &Arguments| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            ArgumentScheme::new(),
        ));
        let counter = Arc::clone(&second);
        assert!(!registry.register(
            "show",
            "second",
            move |_: &Arguments| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            ArgumentScheme::new().required("x"),
        ));

        let cmd = registry.lookup("show").unwrap();
        assert_eq!(cmd.description(), "first");
        assert!(cmd.scheme().is_empty());
        cmd.execute(&Arguments::new()).unwrap();

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_names_in_registration_order() {
        let mut registry = CommandRegistry::new();
        registry.register("show", "", noop, ArgumentScheme::new());
        registry.register("call", "", noop, ArgumentScheme::new());
        registry.register("join-conference", "", noop, ArgumentScheme::new());

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["show", "call", "join-conference"]);
        assert_eq!(registry.iter().count(), 3);
    }

    #[test]
    fn test_suggest_close_name() {
        let mut registry = CommandRegistry::new();
        registry.register("show", "", noop, ArgumentScheme::new());
        registry.register("call", "", noop, ArgumentScheme::new());

        assert_eq!(registry.suggest("cal"), Some("call".to_string()));
        assert_eq!(registry.suggest("shwo"), Some("show".to_string()));
        assert_eq!(registry.suggest("initiate"), None);
    }

    #[test]
    fn test_empty_registry() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.contains("show"));
        assert_eq!(registry.suggest("show"), None);
    }
}
