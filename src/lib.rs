//! cmdparser - typed command trees on top of clap
//!
//! Hosts declare commands, flags, aliases and usage examples through small
//! typed structs, compose them into a tree and execute the root once per
//! process. Command trees can also be loaded from YAML manifests.

// Public modules
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod output;

// Re-export commonly used types
pub use command::{Command, Example, FlagOptions, FlagValue, Options, ParsedArgs};
pub use error::{CmdError, ConfigError, Result};
pub use output::{ExecutionMode, Output, Verbosity};

/// Current version of cmdparser
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
