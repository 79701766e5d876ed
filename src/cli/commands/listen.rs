//! `listen`: dispatch stdin line by line.
//!
//! Every non-empty line is one dispatch attempt. Rejected lines are logged
//! and reported on the event stream; they never stop the loop. The loop
//! ends at EOF or on SIGINT/SIGTERM.

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

use crate::cli::args::ListenArgs;
use crate::cli::commands::Session;
use crate::error::SipCmdError;
use crate::observability::init_metrics;

/// Counts of what a listen session did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenSummary {
    /// Lines that ran a handler.
    pub dispatched: u64,
    /// Lines rejected before any handler ran.
    pub rejected: u64,
}

/// Dispatch stdin until EOF or a shutdown signal.
///
/// # Errors
///
/// Returns an I/O error if stdin cannot be read or the metrics endpoint
/// cannot be started.
pub async fn run(args: &ListenArgs, session: &Session) -> Result<(), SipCmdError> {
    if let Some(port) = args.metrics_port {
        init_metrics(port)?;
        info!(port, "Prometheus metrics endpoint started");
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let summary = serve(stdin, session, shutdown_signal()).await?;
    info!(
        dispatched = summary.dispatched,
        rejected = summary.rejected,
        "listen finished"
    );
    Ok(())
}

/// Dispatch each line of `reader` until EOF or `shutdown` completes.
///
/// # Errors
///
/// Returns an I/O error if reading fails.
pub async fn serve<R>(
    reader: R,
    session: &Session,
    shutdown: impl Future<Output = ()>,
) -> Result<ListenSummary, SipCmdError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut summary = ListenSummary::default();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => {
                info!("shutdown requested");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match session.dispatch_line(line) {
                    Ok(()) => summary.dispatched += 1,
                    Err(_) => summary.rejected += 1,
                }
            }
        }
    }

    Ok(summary)
}

async fn shutdown_signal() {
    let Ok(mut sigterm) =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
    else {
        let _ = tokio::signal::ctrl_c().await;
        return;
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}
