//! Command-line interface for the `sipcmd` binary.

pub mod args;
pub mod commands;
