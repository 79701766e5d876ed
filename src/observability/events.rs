//! Structured event stream for `sipcmd`.
//!
//! The built-in command handlers report the effect they requested as typed
//! events, serialized as newline-delimited JSON (JSONL) with a monotonically
//! increasing sequence number. Rejected inputs are reported on the same
//! stream so a consumer sees every dispatch attempt in order.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A discrete event emitted while dispatching.
///
/// Each variant is tagged with `"type"` when serialized to JSON so consumers
/// can dispatch on the event kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The main window was asked to show itself.
    WindowShown {
        /// When the request was made.
        timestamp: DateTime<Utc>,
    },

    /// An audio call was requested.
    CallRequested {
        /// When the request was made.
        timestamp: DateTime<Utc>,
        /// Address to call.
        sip_address: String,
    },

    /// Joining a conference was requested.
    ConferenceJoinRequested {
        /// When the request was made.
        timestamp: DateTime<Utc>,
        /// Conference address.
        sip_address: String,
        /// Conference identifier.
        conference_id: String,
    },

    /// A conference was created.
    ConferenceInitiated {
        /// When the conference was created.
        timestamp: DateTime<Utc>,
        /// New conference identifier.
        conference_id: String,
        /// Identifier of the conference this one replaced, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        replaced: Option<String>,
    },

    /// A conference with the requested id was already running.
    ConferenceExists {
        /// When the request was made.
        timestamp: DateTime<Utc>,
        /// Conference identifier.
        conference_id: String,
    },

    /// A conference request was refused.
    ConferenceRefused {
        /// When the request was made.
        timestamp: DateTime<Utc>,
        /// Address that was received.
        sip_address: String,
        /// Why it was refused.
        reason: String,
    },

    /// An input was rejected before any handler ran.
    DispatchRejected {
        /// When the input was rejected.
        timestamp: DateTime<Utc>,
        /// The raw input.
        input: String,
        /// Stable rejection kind (e.g. `"unknown_command"`).
        kind: String,
        /// Human-readable reason.
        reason: String,
    },
}

/// One JSONL line: the event plus its position in the stream.
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    sequence: u64,
    #[serde(flatten)]
    event: &'a Event,
}

struct Sink {
    writer: BufWriter<Box<dyn Write + Send>>,
    next_sequence: u64,
}

/// Thread-safe JSONL event writer.
///
/// Sequence numbers are assigned while the writer is held, so they appear
/// in the output in strictly increasing order. A line is flushed as soon
/// as it is written. Write failures are dropped: a broken sink never
/// aborts a dispatch.
pub struct EventEmitter {
    sink: Mutex<Sink>,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("events", &self.event_count())
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Writes events to `writer`.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            sink: Mutex::new(Sink {
                writer: BufWriter::new(writer),
                next_sequence: 0,
            }),
        }
    }

    /// Writes events to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Counts events without writing them anywhere.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Writes events to a newly created (or truncated) file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(Box::new(File::create(path)?)))
    }

    /// Appends `event` to the stream and returns its sequence number.
    pub fn emit(&self, event: Event) -> u64 {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let sequence = sink.next_sequence;
        sink.next_sequence += 1;

        let envelope = Envelope {
            sequence,
            event: &event,
        };
        if let Ok(line) = serde_json::to_string(&envelope) {
            let _ = writeln!(sink.writer, "{line}");
            let _ = sink.writer.flush();
        }
        sequence
    }

    /// Number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_sequence
    }
}
