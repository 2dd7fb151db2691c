//! Typed flag declarations
//!
//! A [`FlagOptions`] is what a host fills in to ask for a flag. It is
//! validated into a [`Flag`], which knows how to render itself as a global
//! clap argument and how to read its value back out of the matches.

use crate::error::{ConfigError, ConfigResult};
use clap::{value_parser, Arg, ArgAction, ArgMatches};
use std::fmt;

/// The value of a flag, tagged by kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    String(String),
    Int(i64),
    Bool(bool),
}

impl FlagValue {
    /// Name of the kind, as used in manifests and messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            FlagValue::String(_) => "string",
            FlagValue::Int(_) => "int",
            FlagValue::Bool(_) => "bool",
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::String(s) => write!(f, "{}", s),
            FlagValue::Int(i) => write!(f, "{}", i),
            FlagValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Request to register one flag.
///
/// Exactly one of `string`, `int` and `bool` must be set; the value set is
/// both the flag's kind and its default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagOptions {
    /// Long name, used as `--name`
    pub name: String,

    /// Optional single-letter shorthand, used as `-s`
    pub shorthand: Option<char>,

    /// Help text
    pub usage: String,

    /// Default for a string flag
    pub string: Option<String>,

    /// Default for an integer flag
    pub int: Option<i64>,

    /// Default for a boolean flag
    pub bool: Option<bool>,
}

impl FlagOptions {
    /// A string flag with the given default
    pub fn string(
        name: impl Into<String>,
        default: impl Into<String>,
        usage: impl Into<String>,
    ) -> Self {
        FlagOptions {
            name: name.into(),
            usage: usage.into(),
            string: Some(default.into()),
            ..Default::default()
        }
    }

    /// An integer flag with the given default
    pub fn int(name: impl Into<String>, default: i64, usage: impl Into<String>) -> Self {
        FlagOptions {
            name: name.into(),
            usage: usage.into(),
            int: Some(default),
            ..Default::default()
        }
    }

    /// A boolean flag with the given default
    pub fn bool(name: impl Into<String>, default: bool, usage: impl Into<String>) -> Self {
        FlagOptions {
            name: name.into(),
            usage: usage.into(),
            bool: Some(default),
            ..Default::default()
        }
    }

    /// Set the single-letter shorthand
    pub fn with_shorthand(mut self, shorthand: char) -> Self {
        self.shorthand = Some(shorthand);
        self
    }

    /// Check the request and turn it into a registrable flag
    pub fn validate(self) -> ConfigResult<Flag> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyFlagName);
        }
        if self.usage.is_empty() {
            return Err(ConfigError::EmptyFlagUsage(self.name));
        }

        let default = match (self.string, self.int, self.bool) {
            (Some(s), None, None) => FlagValue::String(s),
            (None, Some(i), None) => FlagValue::Int(i),
            (None, None, Some(b)) => FlagValue::Bool(b),
            (None, None, None) => return Err(ConfigError::MissingFlagKind(self.name)),
            _ => return Err(ConfigError::MultipleFlagKinds(self.name)),
        };

        Ok(Flag {
            name: self.name,
            shorthand: self.shorthand,
            usage: self.usage,
            default,
        })
    }
}

/// A validated flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    name: String,
    shorthand: Option<char>,
    usage: String,
    default: FlagValue,
}

impl Flag {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shorthand(&self) -> Option<char> {
        self.shorthand
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn default_value(&self) -> &FlagValue {
        &self.default
    }

    /// Render the flag as a clap argument visible to all subcommands
    pub fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name.clone())
            .long(self.name.clone())
            .help(self.usage.clone())
            .global(true);

        if let Some(c) = self.shorthand {
            arg = arg.short(c);
        }

        match &self.default {
            FlagValue::String(default) => arg
                .action(ArgAction::Set)
                .value_name(self.name.to_uppercase())
                .default_value(default.clone()),
            FlagValue::Int(default) => arg
                .action(ArgAction::Set)
                .value_name(self.name.to_uppercase())
                .value_parser(value_parser!(i64))
                .default_value(default.to_string()),
            // `--flag` alone means true; `--flag=false` turns it off
            FlagValue::Bool(default) => arg
                .action(ArgAction::Set)
                .value_parser(value_parser!(bool))
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .default_value(default.to_string()),
        }
    }

    /// Read the flag's current value out of the matches, falling back to the
    /// default when the flag is unknown to them
    pub fn value_from(&self, matches: &ArgMatches) -> FlagValue {
        let id = self.name.as_str();
        let value = match &self.default {
            FlagValue::String(_) => matches
                .try_get_one::<String>(id)
                .ok()
                .flatten()
                .map(|s| FlagValue::String(s.clone())),
            FlagValue::Int(_) => matches
                .try_get_one::<i64>(id)
                .ok()
                .flatten()
                .map(|i| FlagValue::Int(*i)),
            FlagValue::Bool(_) => matches
                .try_get_one::<bool>(id)
                .ok()
                .flatten()
                .map(|b| FlagValue::Bool(*b)),
        };

        value.unwrap_or_else(|| self.default.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Command;

    #[test]
    fn test_validate_string_flag() {
        let flag = FlagOptions::string("database", "master", "Database to use")
            .with_shorthand('d')
            .validate()
            .unwrap();

        assert_eq!(flag.name(), "database");
        assert_eq!(flag.shorthand(), Some('d'));
        assert_eq!(flag.default_value(), &FlagValue::String("master".to_string()));
    }

    #[test]
    fn test_validate_empty_name() {
        let err = FlagOptions::bool("", false, "usage").validate().unwrap_err();
        assert_eq!(err, ConfigError::EmptyFlagName);
    }

    #[test]
    fn test_validate_empty_usage() {
        let err = FlagOptions::int("port", 1433, "").validate().unwrap_err();
        assert_eq!(err, ConfigError::EmptyFlagUsage("port".to_string()));
    }

    #[test]
    fn test_validate_multiple_kinds() {
        let mut options = FlagOptions::string("port", "", "Port");
        options.int = Some(1433);
        let err = options.validate().unwrap_err();
        assert_eq!(err, ConfigError::MultipleFlagKinds("port".to_string()));

        let options = FlagOptions {
            name: "all".to_string(),
            usage: "All three".to_string(),
            string: Some(String::new()),
            int: Some(0),
            bool: Some(false),
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ConfigError::MultipleFlagKinds(_))
        ));
    }

    #[test]
    fn test_validate_missing_kind() {
        let options = FlagOptions {
            name: "orphan".to_string(),
            usage: "No type".to_string(),
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert_eq!(err, ConfigError::MissingFlagKind("orphan".to_string()));
    }

    #[test]
    fn test_bool_flag_forms() {
        let flag = FlagOptions::bool("detailed", false, "Detailed output")
            .validate()
            .unwrap();
        let cmd = Command::new("test").arg(flag.to_arg());

        let matches = cmd.clone().try_get_matches_from(["test"]).unwrap();
        assert_eq!(flag.value_from(&matches), FlagValue::Bool(false));

        let matches = cmd.clone().try_get_matches_from(["test", "--detailed"]).unwrap();
        assert_eq!(flag.value_from(&matches), FlagValue::Bool(true));

        let matches = cmd
            .try_get_matches_from(["test", "--detailed=false"])
            .unwrap();
        assert_eq!(flag.value_from(&matches), FlagValue::Bool(false));
    }

    #[test]
    fn test_int_flag_with_shorthand() {
        let flag = FlagOptions::int("port", 1433, "Port")
            .with_shorthand('p')
            .validate()
            .unwrap();
        let cmd = Command::new("test").arg(flag.to_arg());

        let matches = cmd.clone().try_get_matches_from(["test"]).unwrap();
        assert_eq!(flag.value_from(&matches), FlagValue::Int(1433));

        let matches = cmd.clone().try_get_matches_from(["test", "-p", "1500"]).unwrap();
        assert_eq!(flag.value_from(&matches), FlagValue::Int(1500));

        assert!(cmd.try_get_matches_from(["test", "--port", "abc"]).is_err());
    }

    #[test]
    fn test_flag_value_display() {
        assert_eq!(FlagValue::String("x".to_string()).to_string(), "x");
        assert_eq!(FlagValue::Int(7).to_string(), "7");
        assert_eq!(FlagValue::Bool(true).to_string(), "true");
        assert_eq!(FlagValue::Int(7).kind_name(), "int");
    }
}
