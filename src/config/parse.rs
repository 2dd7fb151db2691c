//! Manifest parsing and command tree construction

use crate::command::{Command, FirstArgAlternativeForFlag, Options, RunFn};
use crate::config::schema::validate_manifest;
use crate::config::types::CommandManifest;
use crate::error::{ConfigError, Result};
use crate::output::Output;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Run callbacks keyed by space-separated command path, root name first
/// (e.g. `"tool config use-context"`)
pub type Handlers = HashMap<String, RunFn>;

/// Parse a manifest file, resolving includes relative to it
pub fn parse_manifest_file(path: &Path) -> Result<CommandManifest> {
    load_manifest_file(path, &mut Vec::new())
}

/// Parse a manifest from a string
pub fn parse_manifest(yaml: &str) -> Result<CommandManifest> {
    let manifest: CommandManifest = serde_yaml::from_str(yaml)?;
    Ok(manifest)
}

/// Load one manifest file. `chain` holds the canonical paths of the files
/// currently being included, outermost first.
fn load_manifest_file(path: &Path, chain: &mut Vec<PathBuf>) -> Result<CommandManifest> {
    let read_error = |e: std::io::Error| {
        ConfigError::Invalid(format!("Failed to read file '{}': {}", path.display(), e))
    };
    let canonical = fs::canonicalize(path).map_err(read_error)?;

    if chain.contains(&canonical) {
        let cycle = chain
            .iter()
            .chain(std::iter::once(&canonical))
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        return Err(ConfigError::Invalid(format!("include cycle: {}", cycle)).into());
    }

    let contents = fs::read_to_string(&canonical).map_err(read_error)?;
    let mut manifest = parse_manifest(&contents)?;

    let base_dir = canonical
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    chain.push(canonical);
    let result = process_includes(&mut manifest, &base_dir, chain);
    chain.pop();
    result?;

    Ok(manifest)
}

/// Replace every `include` entry with the manifest it points to
fn process_includes(
    manifest: &mut CommandManifest,
    base_dir: &Path,
    chain: &mut Vec<PathBuf>,
) -> Result<()> {
    for command in &mut manifest.commands {
        if let Some(include_path) = command.include.take() {
            *command = load_manifest_file(&base_dir.join(include_path), chain)?;
        } else {
            process_includes(command, base_dir, chain)?;
        }
    }

    Ok(())
}

impl CommandManifest {
    /// Validate the manifest and build the command tree it describes.
    ///
    /// Handlers are moved onto the commands they name. A handler whose path
    /// matches no command is an error.
    pub fn build(self, output: &Rc<Output>, mut handlers: Handlers) -> Result<Command> {
        validate_manifest(&self)?;

        let command = self.build_at(output, &mut handlers, None)?;
        command.validate()?;

        if let Some(path) = handlers.keys().min() {
            let message = format!("No command found for handler '{}'", path);
            return Err(ConfigError::Invalid(message).into());
        }

        Ok(command)
    }

    fn build_at(
        self,
        output: &Rc<Output>,
        handlers: &mut Handlers,
        parent: Option<&str>,
    ) -> Result<Command> {
        let path = match parent {
            Some(parent) => format!("{} {}", parent, self.name()),
            None => self.name().to_string(),
        };

        let sub_commands = self
            .commands
            .into_iter()
            .map(|c| c.build_at(output, handlers, Some(&path)))
            .collect::<Result<Vec<_>>>()?;

        let options = Options {
            use_line: self.use_line,
            short: self.short,
            long: self.long,
            aliases: self.aliases,
            examples: self.examples,
            run: handlers.remove(&path),
            first_arg_alternative_for_flag: self
                .first_arg_alternative_for_flag
                .map(FirstArgAlternativeForFlag::new),
        };

        let mut command = Command::define(options, Rc::clone(output), sub_commands)?;
        for flag in &self.flags {
            command.add_flag(flag.to_flag_options()?)?;
        }

        Ok(command)
    }
}
