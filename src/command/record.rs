//! Command records: a name, a description, a handler and an argument scheme.

use std::fmt;

use indexmap::IndexMap;

use crate::address::{Address, header_or_empty};
use crate::error::DispatchError;

use super::scheme::ArgumentScheme;

/// Argument mapping handed to handlers.
pub type Arguments = IndexMap<String, String>;

/// Reserved key holding the resolved command name.
pub const METHOD_KEY: &str = "method";

/// Reserved key holding the address string on the address path.
pub const SIP_ADDRESS_KEY: &str = "sip-address";

/// The effect bound to a command.
///
/// Implemented for every `Fn(&Arguments) + Send + Sync` closure, so most
/// registrations pass a closure directly.
pub trait Handler: Send + Sync {
    /// Runs the effect with the validated arguments.
    fn handle(&self, args: &Arguments);
}

impl<F> Handler for F
where
    F: Fn(&Arguments) + Send + Sync,
{
    fn handle(&self, args: &Arguments) {
        self(args);
    }
}

/// A registered command.
pub struct Command {
    name: String,
    description: String,
    handler: Box<dyn Handler>,
    scheme: ArgumentScheme,
}

// handler is opaque
impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

impl Command {
    /// Creates a command record.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: impl Handler + 'static,
        scheme: ArgumentScheme,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            handler: Box::new(handler),
            scheme,
        }
    }

    /// The command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description, used for listings only.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The declared arguments.
    #[must_use]
    pub const fn scheme(&self) -> &ArgumentScheme {
        &self.scheme
    }

    /// Returns `true` if the command declares an argument called `name`.
    #[must_use]
    pub fn arg_name_exists(&self, name: &str) -> bool {
        self.scheme.contains(name)
    }

    /// Validates `args` against the scheme and runs the handler once.
    ///
    /// Undeclared keys pass through to the handler untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MissingArgument`] for the first required
    /// argument absent from `args`; the handler is not invoked.
    pub fn execute(&self, args: &Arguments) -> Result<(), DispatchError> {
        if let Some(missing) = self
            .scheme
            .required_names()
            .find(|name| !args.contains_key(*name))
        {
            return Err(DispatchError::MissingArgument {
                command: self.name.clone(),
                argument: missing.to_string(),
            });
        }

        self.handler.handle(args);
        Ok(())
    }

    /// Builds the argument mapping from an address and executes it.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MissingArgument`] when a required argument's
    /// header is empty or absent.
    pub fn execute_from_address(&self, address: &dyn Address) -> Result<(), DispatchError> {
        let args = self.arguments_from_address(address);
        self.execute(&args)
    }

    /// Normalizes an address into the same mapping shape the plain path
    /// produces.
    ///
    /// `sip-address` holds the address string and `method` the command name.
    /// Every other declared argument is read from the header of the same name.
    /// Empty headers are kept as `""` for optional arguments and left out for
    /// required ones, so that [`execute`](Self::execute) reports them missing.
    #[must_use]
    pub fn arguments_from_address(&self, address: &dyn Address) -> Arguments {
        let mut args = Arguments::new();
        args.insert(METHOD_KEY.to_string(), self.name.clone());
        args.insert(SIP_ADDRESS_KEY.to_string(), address.as_str().to_string());

        for (name, argument) in self.scheme.iter() {
            if name == METHOD_KEY || name == SIP_ADDRESS_KEY {
                continue;
            }
            let value = header_or_empty(address, name);
            if value.is_empty() && !argument.optional {
                continue;
            }
            args.insert(name.to_string(), value.to_string());
        }

        args
    }
}
