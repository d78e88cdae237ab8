//! Subprocess execution

pub mod subprocess;

pub use subprocess::{CommandResult, CommandRunner, SystemRunner};
