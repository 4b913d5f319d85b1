//! Gapscope CLI library.
//!
//! This library provides the core functionality for the `gapscope` command-line
//! interface: configuration loading, document extraction, collaborator wiring,
//! command execution and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod output;
pub mod source;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::{Formatter, OutputFormat};
