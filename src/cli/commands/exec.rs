//! `exec`: dispatch a single input.

use crate::cli::args::ExecArgs;
use crate::cli::commands::Session;
use crate::error::SipCmdError;

/// Dispatch the joined input words once.
///
/// # Errors
///
/// Returns [`SipCmdError::Dispatch`] when the input is rejected; no handler
/// has run in that case.
pub fn run(args: &ExecArgs, session: &Session) -> Result<(), SipCmdError> {
    let line = args.line();
    session.dispatch_line(&line)?;
    Ok(())
}
