//! Command manifest types
//!
//! A manifest is a YAML description of a command tree: the options of each
//! command, its flags and its nested subcommands.

use crate::command::{Example, FlagOptions};
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One command in a manifest
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CommandManifest {
    /// Command name followed by an optional argument hint
    #[serde(rename = "use", default)]
    pub use_line: String,

    /// One-line description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub short: String,

    /// Full description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub long: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Example>,

    /// String flag that a single bare argument may replace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_arg_alternative_for_flag: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<FlagManifest>,

    /// Subcommands, in the order they are declared
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandManifest>,

    /// Load this command from another manifest file, relative to this one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<PathBuf>,
}

impl CommandManifest {
    /// The command's name: the first word of the use line
    pub fn name(&self) -> &str {
        self.use_line.split_whitespace().next().unwrap_or_default()
    }
}

/// One flag in a manifest
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FlagManifest {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shorthand: Option<char>,

    pub usage: String,

    /// Flag type: string, int or bool
    #[serde(rename = "type", default = "default_flag_type")]
    pub flag_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FlagDefault>,
}

fn default_flag_type() -> String {
    "string".to_string()
}

/// A default value as written in YAML
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FlagDefault {
    Bool(bool),
    Int(i64),
    String(String),
}

impl FlagManifest {
    /// Convert into a registration request, checking the default against the type
    pub fn to_flag_options(&self) -> ConfigResult<FlagOptions> {
        let options = match self.flag_type.as_str() {
            "string" => {
                let default = match &self.default {
                    None => String::new(),
                    Some(FlagDefault::String(s)) => s.clone(),
                    Some(FlagDefault::Int(i)) => i.to_string(),
                    Some(FlagDefault::Bool(b)) => b.to_string(),
                };
                FlagOptions::string(self.name.clone(), default, self.usage.clone())
            }
            "int" | "integer" => {
                let default = match &self.default {
                    None => 0,
                    Some(FlagDefault::Int(i)) => *i,
                    Some(FlagDefault::String(s)) => s.parse().map_err(|_| self.bad_default())?,
                    Some(FlagDefault::Bool(_)) => return Err(self.bad_default()),
                };
                FlagOptions::int(self.name.clone(), default, self.usage.clone())
            }
            "bool" | "boolean" => {
                let default = match &self.default {
                    None => false,
                    Some(FlagDefault::Bool(b)) => *b,
                    Some(_) => return Err(self.bad_default()),
                };
                FlagOptions::bool(self.name.clone(), default, self.usage.clone())
            }
            other => {
                return Err(ConfigError::Invalid(format!(
                    "Invalid flag type: {}. Must be one of: string, int, bool",
                    other
                )))
            }
        };

        Ok(FlagOptions {
            shorthand: self.shorthand,
            ..options
        })
    }

    fn bad_default(&self) -> ConfigError {
        ConfigError::Invalid(format!(
            "Default for flag '{}' does not match its type '{}'",
            self.name, self.flag_type
        ))
    }
}
