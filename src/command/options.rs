//! Declarative options for a command node

use crate::command::ParsedArgs;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Callback invoked when a command is the one resolved from the command line
pub type RunFn = Box<dyn Fn(ParsedArgs) -> anyhow::Result<()>>;

/// A usage example shown in help text
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Example {
    /// What the example demonstrates
    pub description: String,

    /// Command lines to run, in order
    #[serde(default)]
    pub steps: Vec<String>,
}

impl Example {
    pub fn new<S: Into<String>>(
        description: impl Into<String>,
        steps: impl IntoIterator<Item = S>,
    ) -> Self {
        Example {
            description: description.into(),
            steps: steps.into_iter().map(Into::into).collect(),
        }
    }
}

/// Lets a single bare argument stand in for a string flag.
///
/// `tool use-context mine` behaves like `tool use-context --name mine`,
/// and giving both is a usage error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FirstArgAlternativeForFlag {
    /// Name of the string flag the argument replaces
    pub flag: String,
}

impl FirstArgAlternativeForFlag {
    pub fn new(flag: impl Into<String>) -> Self {
        FirstArgAlternativeForFlag { flag: flag.into() }
    }
}

/// Everything a host declares about one command
#[derive(Default)]
pub struct Options {
    /// Command name followed by an optional argument hint, e.g. `use-context [name]`
    pub use_line: String,

    /// One-line description
    pub short: String,

    /// Full description (defaults to `short`)
    pub long: String,

    /// Alternate names the command can be invoked by
    pub aliases: Vec<String>,

    pub examples: Vec<Example>,

    pub run: Option<RunFn>,

    pub first_arg_alternative_for_flag: Option<FirstArgAlternativeForFlag>,
}

impl Options {
    /// Start options for a command with the given use line
    pub fn new(use_line: impl Into<String>) -> Self {
        Options {
            use_line: use_line.into(),
            ..Default::default()
        }
    }

    pub fn with_short(mut self, short: impl Into<String>) -> Self {
        self.short = short.into();
        self
    }

    pub fn with_long(mut self, long: impl Into<String>) -> Self {
        self.long = long.into();
        self
    }

    pub fn with_aliases<S: Into<String>>(mut self, aliases: impl IntoIterator<Item = S>) -> Self {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_example(mut self, example: Example) -> Self {
        self.examples.push(example);
        self
    }

    pub fn with_run<F>(mut self, run: F) -> Self
    where
        F: Fn(ParsedArgs) -> anyhow::Result<()> + 'static,
    {
        self.run = Some(Box::new(run));
        self
    }

    /// Accept one bare argument in place of the named string flag
    pub fn with_first_arg_alternative_for_flag(mut self, flag: impl Into<String>) -> Self {
        self.first_arg_alternative_for_flag = Some(FirstArgAlternativeForFlag::new(flag));
        self
    }

    /// The command's name: the first word of the use line
    pub fn name(&self) -> &str {
        self.use_line.split_whitespace().next().unwrap_or_default()
    }

    /// Argument hint following the name in the use line, if any
    pub fn arg_hint(&self) -> Option<&str> {
        let name = self.name();
        let rest = self.use_line.trim_start()[name.len()..].trim();
        (!rest.is_empty()).then_some(rest)
    }

    /// Render the examples as help text
    pub fn example_text(&self) -> String {
        generate_examples(&self.examples)
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("use_line", &self.use_line)
            .field("short", &self.short)
            .field("long", &self.long)
            .field("aliases", &self.aliases)
            .field("examples", &self.examples)
            .field("run", &self.run.is_some())
            .field("first_arg_alternative_for_flag", &self.first_arg_alternative_for_flag)
            .finish()
    }
}

/// Each example becomes a `# description` header followed by its steps
/// indented by two spaces
pub fn generate_examples(examples: &[Example]) -> String {
    let mut text = String::new();

    for example in examples {
        text.push_str(&format!("# {}\n", example.description));
        for step in &example.steps {
            text.push_str(&format!("  {}\n", step));
        }
    }

    text
}
