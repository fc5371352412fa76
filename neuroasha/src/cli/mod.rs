//! CLI argument parsing module.

mod args;
mod chat;
mod commands;

pub use args::Cli;
pub use commands::execute;
