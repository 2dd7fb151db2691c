//! Command tree nodes
//!
//! A [`Command`] owns its declared options, its flags and its children. The
//! tree is rendered to a `clap::Command` only when it is executed, so flags
//! can be registered on a node after it has been composed into a parent.

use crate::command::{Flag, FlagOptions, FlagValue, Options, ParsedArgs};
use crate::error::{CmdError, ConfigError, ConfigResult, Result};
use crate::output::{ExecutionMode, Output, Verbosity};
use clap::error::ErrorKind;
use clap::{value_parser, Arg, ArgAction, ArgMatches};
use clap_complete::Shell;
use std::ffi::OsString;
use std::io::{self, Write};
use std::rc::Rc;

/// Token that always asks for help
pub const HELP_FLAG: &str = "--help";

/// Pseudo-subcommand that prints shell completion scripts
pub const COMPLETION_COMMAND: &str = "completion";

/// Argument id of the bare argument that may replace a flag
const FIRST_ARG_ID: &str = "first-arg";

const SHELL_ARG_ID: &str = "shell";

const HELP_ARG_ID: &str = "help";

/// Shorthand clap gives the help flag unless a declared flag claims it
const HELP_SHORTHAND: char = 'h';

/// A node in a tree of subcommands
#[derive(Debug)]
pub struct Command {
    options: Options,
    flags: Vec<Flag>,
    sub_commands: Vec<Command>,
    output: Rc<Output>,
    verbosity_flag: Option<String>,
}

impl Command {
    /// Define a command from its options and attach its subcommands.
    ///
    /// The use line must name the command. An empty long description falls
    /// back to the short one.
    pub fn define(
        mut options: Options,
        output: Rc<Output>,
        sub_commands: Vec<Command>,
    ) -> ConfigResult<Self> {
        if options.name().is_empty() {
            return Err(ConfigError::MissingUse);
        }

        if options.long.is_empty() {
            options.long = options.short.clone();
        }

        Ok(Command {
            options,
            flags: Vec::new(),
            sub_commands,
            output,
            verbosity_flag: None,
        })
    }

    /// Register a flag on this command and all of its descendants
    pub fn add_flag(&mut self, options: FlagOptions) -> ConfigResult<()> {
        let flag = options.validate()?;

        if self.flags.iter().any(|f| f.name() == flag.name()) {
            return Err(ConfigError::DuplicateFlag(flag.name().to_string()));
        }

        if let Some(shorthand) = flag.shorthand() {
            if let Some(other) = self.flags.iter().find(|f| f.shorthand() == Some(shorthand)) {
                return Err(ConfigError::DuplicateShorthand {
                    shorthand,
                    first: other.name().to_string(),
                    second: flag.name().to_string(),
                });
            }
        }

        self.flags.push(flag);
        Ok(())
    }

    /// Builder form of [`Command::add_flag`]
    pub fn with_flag(mut self, options: FlagOptions) -> ConfigResult<Self> {
        self.add_flag(options)?;
        Ok(self)
    }

    /// Name the int flag whose value sets the output verbosity once the
    /// command line has been parsed
    pub fn with_verbosity_flag(mut self, name: impl Into<String>) -> Self {
        self.verbosity_flag = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        self.options.name()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub fn sub_commands(&self) -> &[Command] {
        &self.sub_commands
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn set_output(&mut self, output: Rc<Output>) {
        self.output = output;
    }

    /// Check that no shorthand is claimed by two different flags on any
    /// path from this command down to a leaf
    pub fn validate(&self) -> ConfigResult<()> {
        self.check_shorthands(&mut Vec::new())
    }

    fn check_shorthands<'a>(&'a self, visible: &mut Vec<(char, &'a str)>) -> ConfigResult<()> {
        let inherited = visible.len();

        for flag in &self.flags {
            let Some(shorthand) = flag.shorthand() else {
                continue;
            };

            let taken = visible
                .iter()
                .find(|(c, name)| *c == shorthand && *name != flag.name());
            if let Some((_, other)) = taken {
                return Err(ConfigError::DuplicateShorthand {
                    shorthand,
                    first: other.to_string(),
                    second: flag.name().to_string(),
                });
            }

            visible.push((shorthand, flag.name()));
        }

        for sub_command in &self.sub_commands {
            sub_command.check_shorthands(visible)?;
        }

        visible.truncate(inherited);
        Ok(())
    }

    /// Render the tree rooted at this command as a clap command.
    ///
    /// Call [`Command::validate`] first: clap panics on a tree where two
    /// flags share a shorthand.
    pub fn command(&self) -> clap::Command {
        self.build_clap(true, false)
    }

    fn build_clap(&self, is_root: bool, help_shorthand_taken: bool) -> clap::Command {
        let mut cmd = clap::Command::new(self.name().to_string())
            .about(self.options.short.clone())
            .long_about(self.options.long.clone())
            .visible_aliases(self.options.aliases.clone());

        let examples = self.options.example_text();
        if !examples.is_empty() {
            cmd = cmd.after_help(format!("Examples:\n{}", examples));
        }

        // A declared `-h` wins; help stays reachable as `--help`
        let help_shorthand_taken = help_shorthand_taken
            || self
                .flags
                .iter()
                .any(|f| f.shorthand() == Some(HELP_SHORTHAND));
        if help_shorthand_taken {
            cmd = without_help_shorthand(cmd);
        }

        // At most one bare argument, and only when it stands in for a flag
        if let Some(alternative) = &self.options.first_arg_alternative_for_flag {
            let value_name = self
                .options
                .arg_hint()
                .map(|hint| hint.trim_matches(|c| matches!(c, '[' | ']' | '<' | '>')))
                .filter(|hint| !hint.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| alternative.flag.to_uppercase());

            cmd = cmd.arg(
                Arg::new(FIRST_ARG_ID)
                    .value_name(value_name)
                    .help(format!("Alternative to --{}", alternative.flag))
                    .action(ArgAction::Set)
                    .required(false),
            );
        }

        for flag in &self.flags {
            cmd = cmd.arg(flag.to_arg());
        }

        for sub_command in &self.sub_commands {
            cmd = cmd.subcommand(sub_command.build_clap(false, help_shorthand_taken));
        }

        if is_root && !self.has_sub_command_named(COMPLETION_COMMAND) {
            let mut completion = completion_command();
            if help_shorthand_taken {
                completion = without_help_shorthand(completion);
            }
            cmd = cmd.subcommand(completion);
        }

        cmd
    }

    fn has_sub_command_named(&self, name: &str) -> bool {
        self.sub_commands.iter().any(|c| c.name() == name)
    }

    /// Whether `command` is a valid first-level subcommand token.
    ///
    /// `--help` and `completion` are always valid. Otherwise children are
    /// scanned in declaration order, name before aliases.
    pub fn is_sub_command(&self, command: &str) -> bool {
        if command == HELP_FLAG || command == COMPLETION_COMMAND {
            return true;
        }

        self.sub_commands.iter().any(|sub_command| {
            sub_command.name() == command
                || sub_command.options.aliases.iter().any(|alias| alias == command)
        })
    }

    /// Execute the tree against the process arguments
    pub fn execute(&self) -> Result<()> {
        self.execute_from(std::env::args_os())
    }

    /// Execute the tree against an explicit argument list (program name first)
    pub fn execute_from<I, T>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let result = self.dispatch(args);
        self.check_err(result)
    }

    /// Apply the error policy of the output's execution mode.
    ///
    /// Under test every error is handed back. Interactive runs terminate:
    /// clap errors through clap's own exit path, everything else with
    /// `Error: <message>` and status 1.
    pub fn check_err(&self, result: Result<()>) -> Result<()> {
        match (self.output.mode(), result) {
            (_, Ok(())) => Ok(()),
            (ExecutionMode::Test, Err(e)) => Err(e),
            (ExecutionMode::Interactive, Err(CmdError::Parse(e))) => e.exit(),
            (ExecutionMode::Interactive, Err(e)) => self.output.exit_with_error(&e),
        }
    }

    /// Write a completion script for the whole tree
    pub fn generate_completion(&self, shell: Shell, buf: &mut dyn Write) -> ConfigResult<()> {
        self.validate()?;

        let mut cmd = self.command();
        clap_complete::generate(shell, &mut cmd, self.name().to_string(), buf);
        Ok(())
    }

    fn dispatch<I, T>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.validate()?;

        if self.has_sub_command_named(COMPLETION_COMMAND) {
            self.output
                .warn("The declared 'completion' command replaces shell completion generation");
        }

        let matches = match self.command().try_get_matches_from(args) {
            Ok(matches) => matches,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.print()?;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        // Walk down to the command that was asked for, collecting the flags
        // each ancestor makes visible along the way
        let mut node = self;
        let mut node_matches = &matches;
        let mut flags: Vec<&Flag> = self.flags.iter().collect();
        let mut path = vec![self.name()];

        while let Some((name, sub_matches)) = node_matches.subcommand() {
            match node.sub_commands.iter().find(|c| c.name() == name) {
                Some(child) => {
                    node = child;
                    node_matches = sub_matches;
                    flags.extend(child.flags.iter());
                    path.push(child.name());
                }
                None if name == COMPLETION_COMMAND => return self.write_completion(sub_matches),
                None => {
                    let message = format!("Subcommand '{}' is not defined", name);
                    return Err(ConfigError::Invalid(message).into());
                }
            }
        }

        if let Some(verbosity) = self.requested_verbosity(node_matches, &flags) {
            self.output.set_verbosity(verbosity);
            node.output.set_verbosity(verbosity);
        }

        self.output.debug(&format!("Running command: {}", path.join(" ")));
        node.run(node_matches, &flags)
    }

    /// Verbosity asked for through the verbosity flag, if one is named and
    /// it is an int flag visible to the resolved command
    fn requested_verbosity(&self, matches: &ArgMatches, flags: &[&Flag]) -> Option<Verbosity> {
        let name = self.verbosity_flag.as_deref()?;
        let flag = flags.iter().find(|f| f.name() == name)?;

        match flag.value_from(matches) {
            FlagValue::Int(level) => Some(Verbosity::from_level(level)),
            _ => None,
        }
    }

    fn write_completion(&self, matches: &ArgMatches) -> Result<()> {
        let shell = matches
            .try_get_one::<Shell>(SHELL_ARG_ID)
            .ok()
            .flatten()
            .copied()
            .ok_or_else(|| {
                ConfigError::Invalid("A shell must be given for completion".to_string())
            })?;

        let mut stdout = io::stdout();
        self.generate_completion(shell, &mut stdout)?;
        stdout.flush()?;
        Ok(())
    }

    /// Resolve flag values, apply the first-argument rule, then hand the
    /// parsed arguments to the run callback
    fn run(&self, matches: &ArgMatches, flags: &[&Flag]) -> Result<()> {
        let mut parsed = ParsedArgs::new(self.name());
        for flag in flags {
            parsed.set(flag.name(), flag.value_from(matches));
        }

        if let Some(alternative) = &self.options.first_arg_alternative_for_flag {
            let current = match parsed.get(&alternative.flag) {
                Some(FlagValue::String(value)) => value.clone(),
                _ => {
                    let flag = alternative.flag.clone();
                    return Err(ConfigError::AliasTargetNotString(flag).into());
                }
            };

            if let Some(arg) = matches.try_get_one::<String>(FIRST_ARG_ID).ok().flatten() {
                if !current.is_empty() {
                    return self.output.fatal(format!(
                        "Both an argument and the --{0} flag have been provided. \
                         Please provide either an argument or the --{0} flag",
                        alternative.flag
                    ));
                }

                parsed.set(alternative.flag.clone(), FlagValue::String(arg.clone()));
                parsed.push_arg(arg.clone());
            }
        }

        if let Some(run) = &self.options.run {
            run(parsed)?;
        }

        Ok(())
    }
}

/// Replace clap's help flag with one that has no `-h`
fn without_help_shorthand(cmd: clap::Command) -> clap::Command {
    cmd.disable_help_flag(true).arg(
        Arg::new(HELP_ARG_ID)
            .long("help")
            .help("Print help")
            .action(ArgAction::Help),
    )
}

/// The `completion <shell>` subcommand added to every root
fn completion_command() -> clap::Command {
    clap::Command::new(COMPLETION_COMMAND)
        .about("Generate the autocompletion script for the specified shell")
        .arg(
            Arg::new(SHELL_ARG_ID)
                .required(true)
                .value_parser(value_parser!(Shell)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Example;

    fn output() -> Rc<Output> {
        Rc::new(Output::for_tests())
    }

    fn leaf(use_line: &str, aliases: &[&str]) -> Command {
        let options = Options::new(use_line)
            .with_short(format!("The {} command", use_line))
            .with_aliases(aliases.iter().copied());
        Command::define(options, output(), Vec::new()).unwrap()
    }

    fn root(sub_commands: Vec<Command>) -> Command {
        Command::define(Options::new("tool"), output(), sub_commands).unwrap()
    }

    #[test]
    fn test_define_requires_use() {
        let err = Command::define(Options::new(""), output(), Vec::new()).unwrap_err();
        assert_eq!(err, ConfigError::MissingUse);

        let err = Command::define(Options::new("   "), output(), Vec::new()).unwrap_err();
        assert_eq!(err, ConfigError::MissingUse);
    }

    #[test]
    fn test_define_long_defaults_to_short() {
        let options = Options::new("list").with_short("List things");
        let cmd = Command::define(options, output(), Vec::new()).unwrap();
        assert_eq!(cmd.options().long, "List things");

        let cmd = Command::define(
            Options::new("list").with_short("List things").with_long("List all the things"),
            output(),
            Vec::new(),
        )
        .unwrap();
        assert_eq!(cmd.options().long, "List all the things");
    }

    #[test]
    fn test_sub_commands_keep_declared_order() {
        let root = Command::define(
            Options::new("tool"),
            output(),
            vec![leaf("b", &[]), leaf("a", &[]), leaf("c", &[])],
        )
        .unwrap();

        let names: Vec<&str> = root.sub_commands().iter().map(Command::name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_is_sub_command_pseudo_commands() {
        let root = Command::define(Options::new("tool"), output(), Vec::new()).unwrap();
        assert!(root.is_sub_command("--help"));
        assert!(root.is_sub_command("completion"));
        assert!(!root.is_sub_command("list"));
    }

    #[test]
    fn test_is_sub_command_names_and_aliases() {
        let root = Command::define(
            Options::new("tool"),
            output(),
            vec![leaf("list", &["ls"]), leaf("use-context [name]", &["use", "change-context"])],
        )
        .unwrap();

        assert!(root.is_sub_command("list"));
        assert!(root.is_sub_command("ls"));
        assert!(root.is_sub_command("use-context"));
        assert!(root.is_sub_command("change-context"));
        assert!(!root.is_sub_command("foo"));
        assert!(!root.is_sub_command("use-context [name]"));
    }

    #[test]
    fn test_add_flag_rejects_duplicates() {
        let mut cmd = leaf("list", &[]);
        cmd.add_flag(FlagOptions::bool("all", false, "Show all")).unwrap();

        let err = cmd.add_flag(FlagOptions::string("all", "", "Again")).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateFlag("all".to_string()));
        assert_eq!(cmd.flags().len(), 1);
    }

    #[test]
    fn test_add_flag_invalid_registers_nothing() {
        let mut cmd = leaf("list", &[]);
        let mut options = FlagOptions::string("name", "", "Name");
        options.bool = Some(true);

        assert!(cmd.add_flag(options).is_err());
        assert!(cmd.flags().is_empty());
    }

    #[test]
    fn test_clap_rendering() {
        let child = Command::define(
            Options::new("use-context [context-name]")
                .with_short("Switch context")
                .with_aliases(["use"])
                .with_example(Example::new("Use the mssql context", ["tool use-context mssql"]))
                .with_first_arg_alternative_for_flag("name"),
            output(),
            Vec::new(),
        )
        .unwrap()
        .with_flag(FlagOptions::string("name", "", "Context name").with_shorthand('n'))
        .unwrap();

        let root = Command::define(Options::new("tool"), output(), vec![child]).unwrap();
        let cmd = root.command();
        cmd.clone().debug_assert();

        let sub = cmd.find_subcommand("use-context").unwrap();
        assert_eq!(
            sub.get_after_help().map(|s| s.to_string()),
            Some("Examples:\n# Use the mssql context\n  tool use-context mssql\n".to_string())
        );
        assert!(sub.get_all_aliases().any(|a| a == "use"));
        assert_eq!(sub.get_long_about().map(|s| s.to_string()), Some("Switch context".to_string()));
        assert!(sub.get_positionals().any(|a| a.get_id() == FIRST_ARG_ID));
        assert!(cmd.find_subcommand(COMPLETION_COMMAND).is_some());
    }

    #[test]
    fn test_no_positional_without_alternative() {
        let root = root(vec![leaf("list", &[])]);
        assert!(root.execute_from(["tool", "list"]).is_ok());

        let err = root.execute_from(["tool", "list", "extra"]).unwrap_err();
        assert!(matches!(err, CmdError::Parse(_)));
    }

    #[test]
    fn test_help_is_not_an_error() {
        let root = root(vec![leaf("list", &[])]);
        assert!(root.execute_from(["tool", "--help"]).is_ok());
    }

    #[test]
    fn test_check_err_in_test_mode_returns_error() {
        let root = Command::define(Options::new("tool"), output(), Vec::new()).unwrap();

        assert!(root.check_err(Ok(())).is_ok());
        let err = root.check_err(Err(CmdError::Fatal("boom".to_string()))).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_generate_completion() {
        let root = root(vec![leaf("list", &["ls"])]);

        let mut buf = Vec::new();
        root.generate_completion(Shell::Bash, &mut buf).unwrap();
        let script = String::from_utf8(buf).unwrap();

        assert!(script.contains("tool"));
        assert!(script.contains("list"));
    }

    #[test]
    fn test_add_flag_rejects_shared_shorthand() {
        let mut cmd = leaf("list", &[]);
        cmd.add_flag(FlagOptions::int("number", 1, "Number").with_shorthand('n'))
            .unwrap();

        let err = cmd
            .add_flag(FlagOptions::string("name", "", "Name").with_shorthand('n'))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateShorthand {
                shorthand: 'n',
                first: "number".to_string(),
                second: "name".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_inherited_shorthand() {
        let child = leaf("list", &[])
            .with_flag(FlagOptions::string("name", "", "Name").with_shorthand('n'))
            .unwrap();
        let root = root(vec![child])
            .with_flag(FlagOptions::int("number", 1, "Number").with_shorthand('n'))
            .unwrap();

        assert!(matches!(
            root.validate(),
            Err(ConfigError::DuplicateShorthand { shorthand: 'n', .. })
        ));

        let err = root.execute_from(["tool", "list"]).unwrap_err();
        assert!(matches!(
            err,
            CmdError::Config(ConfigError::DuplicateShorthand { .. })
        ));

        let mut buf = Vec::new();
        assert!(root.generate_completion(Shell::Bash, &mut buf).is_err());
    }

    #[test]
    fn test_validate_allows_redeclared_flag() {
        let child = leaf("list", &[])
            .with_flag(FlagOptions::string("name", "", "Name").with_shorthand('n'))
            .unwrap();
        let root = root(vec![child])
            .with_flag(FlagOptions::string("name", "", "Name").with_shorthand('n'))
            .unwrap();

        assert!(root.validate().is_ok());
    }

    #[test]
    fn test_help_shorthand_claimed_by_flag() {
        let root = root(vec![leaf("list", &[])])
            .with_flag(FlagOptions::string("host", "", "Host").with_shorthand('h'))
            .unwrap();
        let cmd = root.command();
        cmd.clone().debug_assert();

        for name in ["list", COMPLETION_COMMAND] {
            let sub = cmd.find_subcommand(name).unwrap();
            let help = sub.get_arguments().find(|a| a.get_id() == HELP_ARG_ID).unwrap();
            assert_eq!(help.get_short(), None);
        }

        assert!(root.execute_from(["tool", "list", "-h", "db1"]).is_ok());
        assert!(root.execute_from(["tool", "list", "--help"]).is_ok());
    }

    #[test]
    fn test_verbosity_flag_sets_output() {
        let root = root(vec![leaf("list", &[])])
            .with_flag(FlagOptions::int("verbosity", 2, "Log level").with_shorthand('v'))
            .unwrap()
            .with_verbosity_flag("verbosity");
        assert_eq!(root.output().verbosity(), Verbosity::Normal);

        root.execute_from(["tool", "list", "-v", "3"]).unwrap();
        assert_eq!(root.output().verbosity(), Verbosity::Verbose);
        assert_eq!(root.sub_commands()[0].output().verbosity(), Verbosity::Verbose);
    }

    #[test]
    fn test_declared_completion_replaces_builtin() {
        let root = root(vec![leaf("completion", &[])]);
        let cmd = root.command();

        assert_eq!(cmd.get_subcommands().filter(|c| c.get_name() == "completion").count(), 1);
        assert!(root.execute_from(["tool", "completion"]).is_ok());
    }
}
