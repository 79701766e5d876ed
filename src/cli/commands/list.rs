//! `list`: show the registered commands.

use std::fmt::Write;

use serde::Serialize;

use crate::cli::args::{ListArgs, OutputFormat};
use crate::cli::commands::Session;
use crate::command::{ArgumentScheme, CommandRegistry};
use crate::error::SipCmdError;

#[derive(Debug, Serialize)]
struct CommandSummary<'a> {
    name: &'a str,
    description: &'a str,
    arguments: &'a ArgumentScheme,
}

/// Print the registered commands with their argument schemes.
///
/// # Errors
///
/// Returns a JSON error if serialization fails.
pub fn run(args: &ListArgs, session: &Session) -> Result<(), SipCmdError> {
    let registry = session.dispatcher.registry();
    let output = match args.format {
        OutputFormat::Human => render_human(registry),
        OutputFormat::Json => render_json(registry)?,
    };
    print!("{output}");
    Ok(())
}

fn render_human(registry: &CommandRegistry) -> String {
    let width = registry.names().map(str::len).max().unwrap_or(0);
    let mut out = String::new();

    for command in registry.iter() {
        let _ = writeln!(out, "{:width$}  {}", command.name(), command.description());
        for (name, argument) in command.scheme().iter() {
            let kind = if argument.optional { "optional" } else { "required" };
            let _ = writeln!(out, "    {name}=<value>  ({kind})");
        }
    }
    out
}

fn render_json(registry: &CommandRegistry) -> Result<String, SipCmdError> {
    let summaries: Vec<_> = registry
        .iter()
        .map(|command| CommandSummary {
            name: command.name(),
            description: command.description(),
            arguments: command.scheme(),
        })
        .collect();
    let mut json = serde_json::to_string_pretty(&summaries)?;
    json.push('\n');
    Ok(json)
}
