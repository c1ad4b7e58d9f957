//! Command line interface for Tessera.

pub mod args;
pub mod commands;

pub use args::{Command, OutputFormat, TesseraArgs};
pub use commands::execute_command;
