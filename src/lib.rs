//! `sipcmd` - command dispatch for plain command lines and SIP-style URIs
//!
//! Applications register named commands with an argument scheme and a
//! handler, then hand raw text to a [`Dispatcher`](dispatcher::Dispatcher).
//! Input is either a plain command line (`call sip-address=sip:bob@x`) or
//! an address URI carrying the command in a `method` header
//! (`sip:bob@x?method=call`); both are normalized into one argument map,
//! validated against the scheme, and passed to the handler.

pub mod address;
pub mod app;
pub mod cli;
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod observability;
pub mod parser;
