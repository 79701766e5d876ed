//! Commands: argument schemes, command records and the registry.

pub mod record;
pub mod registry;
pub mod scheme;

pub use record::{Arguments, Command, Handler, METHOD_KEY, SIP_ADDRESS_KEY};
pub use registry::CommandRegistry;
pub use scheme::{Argument, ArgumentScheme};
