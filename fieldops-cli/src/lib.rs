//! FieldOps CLI library: argument definitions and command handlers.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, TemplatesAction};
