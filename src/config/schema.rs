//! Manifest validation
//!
//! Catches mistakes that would otherwise only surface when the tree runs.

use crate::config::types::CommandManifest;
use crate::error::{ConfigError, ConfigResult};
use std::collections::HashSet;

/// Validate a complete manifest tree
pub fn validate_manifest(manifest: &CommandManifest) -> ConfigResult<()> {
    validate_command(manifest, &[])
}

/// Validate one command, given the string flags its ancestors make visible
fn validate_command<'a>(
    manifest: &'a CommandManifest,
    inherited_strings: &[&'a str],
) -> ConfigResult<()> {
    if manifest.name().is_empty() {
        return Err(ConfigError::MissingUse);
    }

    // Flag names must be unique within a command
    let mut flag_names = HashSet::new();
    for flag in &manifest.flags {
        if !flag_names.insert(flag.name.as_str()) {
            return Err(ConfigError::DuplicateFlag(flag.name.clone()));
        }
        flag.to_flag_options()?;
    }

    let mut visible_strings = inherited_strings.to_vec();
    visible_strings.extend(
        manifest
            .flags
            .iter()
            .filter(|f| f.flag_type == "string")
            .map(|f| f.name.as_str()),
    );

    if let Some(flag) = &manifest.first_arg_alternative_for_flag {
        if !visible_strings.contains(&flag.as_str()) {
            return Err(ConfigError::AliasTargetNotString(flag.clone()));
        }
    }

    // Sibling names and aliases must not collide
    let mut tokens = HashSet::new();
    for command in &manifest.commands {
        let aliases = command.aliases.iter().map(String::as_str);
        for token in std::iter::once(command.name()).chain(aliases) {
            if !tokens.insert(token) {
                return Err(ConfigError::Invalid(format!(
                    "Subcommand name or alias '{}' is declared more than once under '{}'",
                    token,
                    manifest.name()
                )));
            }
        }
    }

    for command in &manifest.commands {
        validate_command(command, &visible_strings)?;
    }

    Ok(())
}
