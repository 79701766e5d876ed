//! Dispatch metrics.
//!
//! Counters for dispatch outcomes and command registrations, with an
//! optional Prometheus exporter. Command labels are limited to registered
//! names so arbitrary input cannot grow label cardinality.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::SipCmdError;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Label used for commands that were never resolved against the registry.
pub const UNKNOWN_LABEL: &str = "__unknown__";

/// Outcome label for a dispatch that invoked a handler.
pub const OUTCOME_DISPATCHED: &str = "dispatched";

/// Installs the global recorder with a Prometheus HTTP listener on
/// `127.0.0.1:<port>`.
///
/// # Errors
///
/// Returns `SipCmdError::Io` if the recorder or HTTP listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: u16) -> Result<(), SipCmdError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    PrometheusBuilder::new()
        .with_http_listener(([127, 0, 0, 1], port))
        .install()
        .map_err(|e| SipCmdError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!(
        "sipcmd_dispatch_total",
        "Dispatch attempts by command and outcome"
    );
    describe_counter!(
        "sipcmd_registrations_total",
        "Command registrations by outcome"
    );
}

/// Records one dispatch attempt.
///
/// `command` must already be a registered name, or `None` when the input
/// never resolved to one. `outcome` is [`OUTCOME_DISPATCHED`] or a
/// [`DispatchError::kind`](crate::error::DispatchError::kind) label.
pub fn record_dispatch(command: Option<&str>, outcome: &'static str) {
    let label = command.unwrap_or(UNKNOWN_LABEL).to_owned();
    counter!("sipcmd_dispatch_total", "command" => label, "outcome" => outcome).increment(1);
}

/// Records a registration attempt.
pub fn record_registration(inserted: bool) {
    let outcome = if inserted { "inserted" } else { "duplicate" };
    counter!("sipcmd_registrations_total", "outcome" => outcome).increment(1);
}
