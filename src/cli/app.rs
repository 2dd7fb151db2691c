//! Demo application
//!
//! A small context-switching tool built on the command tree: it shows flags
//! inherited from the root, aliases, usage examples and an argument that
//! can stand in for a flag.

use crate::command::{Command, Example, FlagOptions, Options, ParsedArgs};
use crate::error::Result;
use crate::output::{ExecutionMode, Output, Verbosity};
use std::rc::Rc;

/// Contexts known to the demo tool
const CONTEXTS: &[&str] = &["mssql", "mssql2", "edge"];

/// Verbosity flag registered on the root and read by every subcommand
const VERBOSITY_FLAG: &str = "verbosity";

/// CLI application
pub struct App {
    /// The root of the command tree
    command: Command,
}

impl App {
    /// Create the app, deciding how fatal errors behave from the process
    pub fn new() -> Result<Self> {
        Self::with_output(Output::new(Verbosity::Normal, ExecutionMode::detect()))
    }

    /// Create the app with a specific output sink
    pub fn with_output(output: Output) -> Result<Self> {
        let command = build_command(Rc::new(output))?;
        Ok(App { command })
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Run the application with command line arguments
    pub fn run(self) -> Result<()> {
        self.command.execute()
    }

    /// Run the application with explicit arguments (program name first)
    pub fn run_from<I, T>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        self.command.execute_from(args)
    }
}

/// Build the demo command tree
fn build_command(output: Rc<Output>) -> Result<Command> {
    let use_context = Command::define(
        Options::new("use-context [context-name]")
            .with_short("Set the current context")
            .with_aliases(["use", "change-context"])
            .with_example(Example::new(
                "Use the context for the sa@sql1 sql instance",
                ["cmdparser use-context mssql"],
            ))
            .with_example(Example::new(
                "Use the context by flag",
                ["cmdparser use-context --name mssql"],
            ))
            .with_first_arg_alternative_for_flag("name")
            .with_run({
                let output = Rc::clone(&output);
                move |args| use_context(&output, args)
            }),
        Rc::clone(&output),
        Vec::new(),
    )?
    .with_flag(
        FlagOptions::string("name", "", "Name of context to set as current context")
            .with_shorthand('n'),
    )?;

    let get_contexts = Command::define(
        Options::new("get-contexts")
            .with_short("Display one or many contexts")
            .with_long("Display one or many contexts from the configuration")
            .with_aliases(["gc"])
            .with_example(Example::new(
                "List all the context names in your configuration",
                ["cmdparser get-contexts"],
            ))
            .with_example(Example::new(
                "List all the contexts in your configuration with details",
                ["cmdparser get-contexts --detailed"],
            ))
            .with_run({
                let output = Rc::clone(&output);
                move |args| get_contexts(&output, args)
            }),
        Rc::clone(&output),
        Vec::new(),
    )?
    .with_flag(FlagOptions::bool("detailed", false, "Include context details"))?;

    let root = Command::define(
        Options::new("cmdparser").with_short("A demo of declared command trees"),
        output,
        vec![use_context, get_contexts],
    )?
    .with_flag(
        FlagOptions::int(
            VERBOSITY_FLAG,
            Verbosity::Normal as i64,
            "Log level, 0 (silent) to 3 (verbose)",
        )
        .with_shorthand('v'),
    )?
    .with_verbosity_flag(VERBOSITY_FLAG);

    Ok(root)
}

fn use_context(output: &Output, args: ParsedArgs) -> anyhow::Result<()> {
    let name = args.string("name").unwrap_or_default();

    if name.is_empty() {
        anyhow::bail!("A context name must be given, either as an argument or with --name");
    }
    if !CONTEXTS.contains(&name) {
        anyhow::bail!("No context exists with the name: \"{}\"", name);
    }

    output.debug(&format!("Known contexts: {}", CONTEXTS.join(", ")));
    println!("Switched to context \"{}\".", name);
    Ok(())
}

fn get_contexts(output: &Output, args: ParsedArgs) -> anyhow::Result<()> {
    let detailed = args.bool("detailed").unwrap_or(false);

    output.info(&format!("Found {} contexts", CONTEXTS.len()));
    for name in CONTEXTS {
        if detailed {
            println!("- name: {}\n  endpoint: {}-endpoint", name, name);
        } else {
            println!("{}", name);
        }
    }
    Ok(())
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<()> {
    App::new()?.run()
}
