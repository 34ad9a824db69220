//! Reshape CLI library.
//!
//! This library provides the core functionality for the `reshape` command-line
//! interface, including configuration management, backend selection, input
//! loading, command execution, and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod provider;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
