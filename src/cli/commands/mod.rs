//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod completions;
pub mod exec;
pub mod list;
pub mod listen;
pub mod version;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;

use crate::address::SipAddress;
use crate::app::{Application, default_registry};
use crate::cli::args::{Cli, Commands};
use crate::config::ConfigLoader;
use crate::dispatcher::Dispatcher;
use crate::error::{DispatchError, SipCmdError};
use crate::observability::{Event, EventEmitter};

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli) -> Result<(), SipCmdError> {
    let options = SessionOptions {
        config: cli.config,
        identity: cli.identity,
        events_file: cli.events_file,
    };

    match cli.command {
        Commands::Exec(args) => exec::run(&args, &Session::open(&options)?),
        Commands::Listen(args) => listen::run(&args, &Session::open(&options)?).await,
        Commands::List(args) => list::run(&args, &Session::open_quiet(&options)?),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Global options shared by the dispatching subcommands.
#[derive(Debug, Default)]
pub struct SessionOptions {
    /// Dispatch configuration file.
    pub config: Option<PathBuf>,
    /// Local account address.
    pub identity: Option<String>,
    /// Event stream destination; stdout when unset.
    pub events_file: Option<PathBuf>,
}

/// A dispatcher wired to the built-in application commands.
#[derive(Debug)]
pub struct Session {
    /// Dispatcher holding the default registry.
    pub dispatcher: Dispatcher,
    /// Event stream shared with the application handlers.
    pub events: Arc<EventEmitter>,
}

impl Session {
    /// Loads configuration and builds the dispatcher, emitting events to
    /// the configured destination.
    ///
    /// # Errors
    ///
    /// Returns a config error for an invalid configuration, a usage error
    /// for an unparseable identity, or an I/O error if the events file
    /// cannot be created.
    pub fn open(options: &SessionOptions) -> Result<Self, SipCmdError> {
        let events = match &options.events_file {
            Some(path) => EventEmitter::from_file(path)?,
            None => EventEmitter::stdout(),
        };
        Self::with_events(options, events)
    }

    /// Same as [`open`](Self::open) but discards events.
    ///
    /// # Errors
    ///
    /// See [`open`](Self::open).
    pub fn open_quiet(options: &SessionOptions) -> Result<Self, SipCmdError> {
        Self::with_events(options, EventEmitter::noop())
    }

    fn with_events(options: &SessionOptions, events: EventEmitter) -> Result<Self, SipCmdError> {
        let config = ConfigLoader::with_defaults().resolve(options.config.as_deref())?;
        if let Some(path) = &options.config {
            tracing::info!(config = %path.display(), "configuration loaded");
        }

        let identity = options.identity.as_deref().map(parse_identity).transpose()?;
        let events = Arc::new(events);
        let app = Arc::new(Application::new(Arc::clone(&events), identity));
        let dispatcher = Dispatcher::new(default_registry(&app), config);

        Ok(Self { dispatcher, events })
    }

    /// Dispatches one input, reporting a rejection on the event stream.
    ///
    /// # Errors
    ///
    /// Returns the rejection when no handler ran.
    pub fn dispatch_line(&self, line: &str) -> Result<(), DispatchError> {
        match self.dispatcher.try_execute_command(line) {
            Ok(_) => Ok(()),
            Err(err) => {
                self.events.emit(Event::DispatchRejected {
                    timestamp: Utc::now(),
                    input: line.to_string(),
                    kind: err.kind().to_string(),
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }
}

fn parse_identity(raw: &str) -> Result<SipAddress, SipCmdError> {
    SipAddress::parse(raw)
        .ok_or_else(|| SipCmdError::Usage(format!("invalid identity address: {raw:?}")))
}
