//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the podgen binary.

mod commands;
mod config;
mod run;
mod serve;

pub use commands::{Cli, Commands};
pub use config::handle_config_command;
pub use run::{handle_run_command, read_job_input};
pub use serve::handle_serve_command;
