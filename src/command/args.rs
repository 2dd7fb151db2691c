//! Parsed arguments handed to run callbacks

use crate::command::FlagValue;
use std::collections::BTreeMap;

/// Values resolved for one invocation: every flag visible to the executing
/// command, plus its positional arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    /// Name of the command that ran
    pub command: String,

    flags: BTreeMap<String, FlagValue>,
    args: Vec<String>,
}

impl ParsedArgs {
    pub fn new(command: impl Into<String>) -> Self {
        ParsedArgs {
            command: command.into(),
            ..Default::default()
        }
    }

    /// Set a flag value
    pub fn set(&mut self, name: impl Into<String>, value: FlagValue) {
        self.flags.insert(name.into(), value);
    }

    /// Get a flag value
    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.flags.get(name)
    }

    /// Get a string flag value
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.flags.get(name) {
            Some(FlagValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Get an integer flag value
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.flags.get(name) {
            Some(FlagValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Get a boolean flag value
    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.flags.get(name) {
            Some(FlagValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn push_arg(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    /// Positional arguments, in order
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Iterate flags by name
    pub fn flags(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), v))
    }
}
