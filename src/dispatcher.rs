//! Command dispatcher.
//!
//! Turns one raw input into zero or one handler invocation:
//!
//! 1. classify the input (address or plain command line);
//! 2. address path: resolve the `method` header and execute from the address;
//! 3. plain path: read the command name, then its `key=value` arguments;
//! 4. validate required arguments and invoke the handler.
//!
//! [`Dispatcher::execute_command`] is fire-and-forget: failures are logged as
//! warnings and never reach the caller. [`Dispatcher::try_execute_command`]
//! runs the same pipeline and returns the outcome.
//!
//! A handler that dispatches into the dispatcher running it is rejected with
//! [`DispatchError::Reentrant`] instead of blocking on the gate.

use std::sync::{Mutex, PoisonError};
use std::thread::{self, ThreadId};

use serde::Serialize;
use tracing::{info, warn};

use crate::address::{AddressResolver, SipAddressResolver};
use crate::command::{Arguments, CommandRegistry, METHOD_KEY};
use crate::config::DispatchConfig;
use crate::error::DispatchError;
use crate::observability::metrics;
use crate::parser::{Classification, classify, parse_args, parse_function_name, resolve_method};

/// Which grammar an input was dispatched through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Plain `name key=value ...` command line.
    Plain,
    /// Address with a recognized scheme.
    Address,
}

impl Source {
    /// Lowercase label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Address => "address",
        }
    }
}

/// A successful dispatch: the handler ran once with `arguments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dispatch {
    /// Name of the command that ran.
    pub command: String,
    /// Grammar the input was parsed with.
    pub source: Source,
    /// Arguments handed to the handler.
    pub arguments: Arguments,
}

/// Entry point for raw command input.
///
/// Owns the registry it dispatches against. Dispatches are serialized: two
/// callers sharing a dispatcher never run parsing or handlers concurrently.
pub struct Dispatcher {
    registry: CommandRegistry,
    resolver: Box<dyn AddressResolver>,
    config: DispatchConfig,
    gate: Mutex<()>,
    // thread holding `gate`, if any
    holder: Mutex<Option<ThreadId>>,
}

/// Records the gate holder; clears it on drop, including during unwinding.
struct HolderGuard<'a>(&'a Mutex<Option<ThreadId>>);

impl<'a> HolderGuard<'a> {
    fn claim(holder: &'a Mutex<Option<ThreadId>>) -> Self {
        *holder.lock().unwrap_or_else(PoisonError::into_inner) = Some(thread::current().id());
        Self(holder)
    }
}

impl Drop for HolderGuard<'_> {
    fn drop(&mut self) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher using the built-in SIP address resolver.
    #[must_use]
    pub fn new(registry: CommandRegistry, config: DispatchConfig) -> Self {
        Self::with_resolver(registry, SipAddressResolver, config)
    }

    /// Creates a dispatcher with a custom address resolver.
    #[must_use]
    pub fn with_resolver(
        registry: CommandRegistry,
        resolver: impl AddressResolver + 'static,
        config: DispatchConfig,
    ) -> Self {
        Self {
            registry,
            resolver: Box::new(resolver),
            config,
            gate: Mutex::new(()),
            holder: Mutex::new(None),
        }
    }

    /// The registry commands are resolved against.
    #[must_use]
    pub const fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Dispatches `raw`, logging any failure.
    pub fn execute_command(&self, raw: &str) {
        let _ = self.try_execute_command(raw);
    }

    /// Dispatches `raw` and reports the outcome.
    ///
    /// Failures are also logged, exactly as with
    /// [`execute_command`](Self::execute_command).
    ///
    /// # Errors
    ///
    /// Returns the [`DispatchError`] that aborted the attempt. No handler has
    /// run when an error is returned. Called from inside one of this
    /// dispatcher's handlers, returns [`DispatchError::Reentrant`].
    pub fn try_execute_command(&self, raw: &str) -> Result<Dispatch, DispatchError> {
        if self.held_by_current_thread() {
            let err = DispatchError::Reentrant {
                input: raw.to_string(),
            };
            warn!(input = raw, kind = err.kind(), "{err}");
            metrics::record_dispatch(None, err.kind());
            return Err(err);
        }

        // `_holder` drops first, so the holder is cleared before the gate opens
        let _gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        let _holder = HolderGuard::claim(&self.holder);

        match self.run(raw) {
            Ok(dispatch) => {
                info!(
                    command = dispatch.command.as_str(),
                    source = dispatch.source.as_str(),
                    arguments = dispatch.arguments.len(),
                    "command dispatched"
                );
                metrics::record_dispatch(Some(&dispatch.command), metrics::OUTCOME_DISPATCHED);
                Ok(dispatch)
            }
            Err(err) => {
                warn!(input = raw, kind = err.kind(), "{err}");
                metrics::record_dispatch(registered_command(&err), err.kind());
                Err(err)
            }
        }
    }

    fn held_by_current_thread(&self) -> bool {
        *self.holder.lock().unwrap_or_else(PoisonError::into_inner) == Some(thread::current().id())
    }

    fn run(&self, raw: &str) -> Result<Dispatch, DispatchError> {
        if let Classification::Address(address) =
            classify(raw, self.resolver.as_ref(), &self.config)?
        {
            let command = resolve_method(address.as_ref(), &self.registry, &self.config)?;
            let arguments = command.arguments_from_address(address.as_ref());
            command.execute(&arguments)?;
            return Ok(Dispatch {
                command: command.name().to_string(),
                source: Source::Address,
                arguments,
            });
        }

        let (command, rest) = parse_function_name(raw, &self.registry)?;
        let parsed = parse_args(command, rest, self.config.bare_tokens)?;

        let mut arguments = Arguments::with_capacity(parsed.len() + 1);
        arguments.insert(METHOD_KEY.to_string(), command.name().to_string());
        arguments.extend(parsed);
        // `method` always names the resolved command
        arguments.insert(METHOD_KEY.to_string(), command.name().to_string());

        command.execute(&arguments)?;
        Ok(Dispatch {
            command: command.name().to_string(),
            source: Source::Plain,
            arguments,
        })
    }
}

/// The registered command an error refers to, if the input got that far.
fn registered_command(err: &DispatchError) -> Option<&str> {
    match err {
        DispatchError::UnknownArgument { command, .. }
        | DispatchError::BareToken { command, .. }
        | DispatchError::MissingArgument { command, .. } => Some(command.as_str()),
        DispatchError::UnparseableInput { .. }
        | DispatchError::UnknownCommand { .. }
        | DispatchError::UnknownMethod { .. }
        | DispatchError::UnsupportedScheme { .. }
        | DispatchError::Reentrant { .. } => None,
    }
}
