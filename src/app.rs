//! Built-in application commands.
//!
//! The stock command set of the desktop client: showing the main window,
//! placing a call, and joining or creating a conference. Handlers do not
//! talk to a communication engine; each one records the single request it
//! would issue on the event stream.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tracing::{info, warn};

use crate::address::{Address, SipAddress};
use crate::command::{ArgumentScheme, Arguments, CommandRegistry, SIP_ADDRESS_KEY};
use crate::observability::{Event, EventEmitter};

/// Argument carrying a conference identifier.
pub const CONFERENCE_ID_KEY: &str = "conference-id";

/// Application state shared by the built-in handlers.
#[derive(Debug)]
pub struct Application {
    events: Arc<EventEmitter>,
    identity: Option<SipAddress>,
    conference: Mutex<Option<String>>,
}

impl Application {
    /// Creates the application state.
    ///
    /// `identity` is the local account address; when set, only conference
    /// requests addressed to it are accepted.
    #[must_use]
    pub fn new(events: Arc<EventEmitter>, identity: Option<SipAddress>) -> Self {
        Self {
            events,
            identity,
            conference: Mutex::new(None),
        }
    }

    /// Identifier of the conference currently initiated, if any.
    #[must_use]
    pub fn current_conference(&self) -> Option<String> {
        self.conference
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn show(&self) {
        info!("showing main window");
        self.events.emit(Event::WindowShown {
            timestamp: Utc::now(),
        });
    }

    fn call(&self, args: &Arguments) {
        let sip_address = arg(args, SIP_ADDRESS_KEY);
        info!(sip_address, "launching audio call");
        self.events.emit(Event::CallRequested {
            timestamp: Utc::now(),
            sip_address: sip_address.to_string(),
        });
    }

    fn join_conference(&self, args: &Arguments) {
        let sip_address = arg(args, SIP_ADDRESS_KEY);
        let conference_id = arg(args, CONFERENCE_ID_KEY);
        info!(sip_address, conference_id, "joining conference");
        self.events.emit(Event::ConferenceJoinRequested {
            timestamp: Utc::now(),
            sip_address: sip_address.to_string(),
            conference_id: conference_id.to_string(),
        });
    }

    fn initiate_conference(&self, args: &Arguments) {
        let sip_address = arg(args, SIP_ADDRESS_KEY);
        let conference_id = arg(args, CONFERENCE_ID_KEY);

        if let Some(identity) = &self.identity {
            if !same_account(identity, sip_address) {
                warn!(
                    identity = identity.as_str(),
                    sip_address, "received different sip address from identity"
                );
                self.events.emit(Event::ConferenceRefused {
                    timestamp: Utc::now(),
                    sip_address: sip_address.to_string(),
                    reason: format!("address does not match identity {}", identity.as_str()),
                });
                return;
            }
        }

        let mut current = self
            .conference
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if current.as_deref() == Some(conference_id) {
            info!(conference_id, "conference already exists");
            self.events.emit(Event::ConferenceExists {
                timestamp: Utc::now(),
                conference_id: conference_id.to_string(),
            });
            return;
        }

        let replaced = current.replace(conference_id.to_string());
        if let Some(previous) = &replaced {
            info!(previous = previous.as_str(), "terminating existing conference");
        }
        info!(conference_id, "conference created");
        self.events.emit(Event::ConferenceInitiated {
            timestamp: Utc::now(),
            conference_id: conference_id.to_string(),
            replaced,
        });
    }
}

/// Builds the stock registry bound to `app`.
#[must_use]
pub fn default_registry(app: &Arc<Application>) -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    let handle = Arc::clone(app);
    registry.register(
        "show",
        "Show the main window",
        move |_: &Arguments| handle.show(),
        ArgumentScheme::new(),
    );

    let handle = Arc::clone(app);
    registry.register(
        "call",
        "Launch an audio call to sip-address",
        move |args: &Arguments| handle.call(args),
        ArgumentScheme::new().required(SIP_ADDRESS_KEY),
    );

    let handle = Arc::clone(app);
    registry.register(
        "join-conference",
        "Join the conference conference-id hosted at sip-address",
        move |args: &Arguments| handle.join_conference(args),
        ArgumentScheme::new()
            .required(SIP_ADDRESS_KEY)
            .required(CONFERENCE_ID_KEY),
    );

    let handle = Arc::clone(app);
    registry.register(
        "initiate-conference",
        "Create the conference conference-id on the local account sip-address",
        move |args: &Arguments| handle.initiate_conference(args),
        ArgumentScheme::new()
            .required(SIP_ADDRESS_KEY)
            .required(CONFERENCE_ID_KEY),
    );

    registry
}

fn arg<'a>(args: &'a Arguments, key: &str) -> &'a str {
    args.get(key).map_or("", String::as_str)
}

/// Compares the account part of two addresses, ignoring parameters and
/// headers.
fn same_account(identity: &SipAddress, candidate: &str) -> bool {
    SipAddress::parse(candidate).is_some_and(|candidate| {
        candidate.scheme() == identity.scheme() && candidate.target() == identity.target()
    })
}
