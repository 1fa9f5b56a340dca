//! Command registry — command names bound to plugin functions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use captable_abi::CommandFn;
use captable_core::error::AppError;

use crate::collection::PluginHandle;

/// A registered command.
#[derive(Debug, Clone, Copy)]
pub struct CommandBinding {
    /// Plugin that registered the command.
    pub plugin: PluginHandle,
    /// Function to call.
    pub command_fn: CommandFn,
}

/// Serializable summary of a registered command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInfo {
    /// Command name.
    pub name: String,
    /// Name of the owning plugin.
    pub plugin: String,
}

/// Registry of plugin commands, keyed by name.
///
/// Names are unique across plugins: the first registration of a name wins
/// and later ones are rejected.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandBinding>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks that `name` can be typed as a command.
    pub fn validate_name(name: &str) -> Result<(), AppError> {
        if name.is_empty() {
            return Err(AppError::validation("Command name is empty"));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(AppError::validation(format!(
                "Command name '{name}' contains whitespace"
            )));
        }
        if name.ends_with('!') {
            return Err(AppError::validation(format!(
                "Command name '{name}' ends with '!'"
            )));
        }
        Ok(())
    }

    /// Binds `name` to `binding`.
    pub fn register(&mut self, name: &str, binding: CommandBinding) -> Result<(), AppError> {
        Self::validate_name(name)?;
        if self.commands.contains_key(name) {
            return Err(AppError::conflict(format!(
                "Command '{name}' is already registered"
            )));
        }
        self.commands.insert(name.to_string(), binding);
        Ok(())
    }

    /// Removes every command of `plugin`. Returns how many were removed.
    pub fn unregister_plugin(&mut self, plugin: PluginHandle) -> usize {
        let before = self.commands.len();
        self.commands.retain(|_, binding| binding.plugin != plugin);
        before - self.commands.len()
    }

    /// Looks up a command.
    pub fn get(&self, name: &str) -> Option<CommandBinding> {
        self.commands.get(name).copied()
    }

    /// Number of commands registered by `plugin`.
    pub fn count_for(&self, plugin: PluginHandle) -> usize {
        self.commands
            .values()
            .filter(|binding| binding.plugin == plugin)
            .count()
    }

    /// All commands, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, CommandBinding)> {
        self.commands
            .iter()
            .map(|(name, binding)| (name.as_str(), *binding))
    }

    /// Total number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// A command line split into name, bang flag and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine<'a> {
    /// Command name without the trailing `!`.
    pub name: &'a str,
    /// Whether the name ended with `!`.
    pub bang: bool,
    /// Everything after the name, trimmed.
    pub args: &'a str,
}

impl<'a> CommandLine<'a> {
    /// Parses `name[!] [args]`. Returns `None` for a blank line.
    pub fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (name, args) = match line.find(char::is_whitespace) {
            Some(i) => (&line[..i], line[i..].trim_start()),
            None => (line, ""),
        };
        let (name, bang) = match name.strip_suffix('!') {
            Some(name) => (name, true),
            None => (name, false),
        };
        Some(Self { name, bang, args })
    }
}
