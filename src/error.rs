//! Error types for cmdparser

use std::io;
use thiserror::Error;

/// Result type alias for cmdparser operations
pub type Result<T> = std::result::Result<T, CmdError>;

/// Main error type for cmdparser
#[derive(Error, Debug)]
pub enum CmdError {
    /// Malformed command or flag declarations
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors raised by clap while resolving the command line
    #[error(transparent)]
    Parse(#[from] clap::Error),

    /// A fatal usage error reported through the output sink
    #[error("{0}")]
    Fatal(String),

    /// Errors returned by a command's run callback
    #[error(transparent)]
    Run(#[from] anyhow::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors in the way a host declares its commands and flags.
///
/// These are defects in the calling code rather than bad user input.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Command must declare a use line")]
    MissingUse,

    #[error("Flag must provide a name")]
    EmptyFlagName,

    #[error("Flag '{0}' must provide usage")]
    EmptyFlagUsage(String),

    #[error("Flag '{0}' must provide only one type")]
    MultipleFlagKinds(String),

    #[error("Flag '{0}' must provide a type")]
    MissingFlagKind(String),

    #[error("Flag '{0}' is already registered on this command")]
    DuplicateFlag(String),

    #[error("Shorthand '-{shorthand}' is used by both '{first}' and '{second}'")]
    DuplicateShorthand {
        shorthand: char,
        first: String,
        second: String,
    },

    #[error("Flag '{0}' must be a registered string flag to accept an argument in its place")]
    AliasTargetNotString(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
