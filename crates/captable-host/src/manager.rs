//! Plugin manager — loads plugins and drives their lifecycle.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use captable_abi::{
    ByteSlice, CapabilityTable, CommandContext, PluginInitFn, PluginUserData, StatusLevel,
};
use captable_core::config::AppConfig;
use captable_core::error::AppError;
use captable_core::result::AppResult;

use crate::api::host_table;
use crate::collection::{PluginCollection, PluginHandle, PluginInfo, PluginState};
use crate::commands::{CommandInfo, CommandLine, CommandRegistry};
use crate::scope::{CallPhase, HostScope, HostState};
use crate::status::{StatusBar, StatusMessage, StatusSink};

/// Result of running a plugin command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// The command returned a null or empty message.
    Completed {
        /// Owning plugin.
        plugin: String,
    },
    /// The command returned a failure message.
    Failed {
        /// Owning plugin.
        plugin: String,
        /// The message exactly as returned by the plugin.
        message: String,
    },
}

impl CommandOutcome {
    /// Returns `true` for [`CommandOutcome::Completed`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// The failure message, if any.
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Completed { .. } => None,
            Self::Failed { message, .. } => Some(message),
        }
    }
}

/// Owns every loaded plugin and serializes all calls into them.
///
/// Not `Send`: plugin user data is an opaque pointer and plugins are only
/// ever called from the thread that loaded them.
#[derive(Debug)]
pub struct PluginManager {
    state: HostState,
    table: &'static CapabilityTable,
    surface_command_errors: bool,
}

impl PluginManager {
    /// Creates a manager with default settings.
    pub fn new() -> Self {
        Self::from_config(&AppConfig::default())
    }

    /// Creates a manager from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            state: HostState {
                plugins: PluginCollection::new(),
                commands: CommandRegistry::new(),
                status: StatusBar::new(config.host.status_history),
                max_commands_per_plugin: config.plugins.max_commands_per_plugin,
            },
            table: host_table(),
            surface_command_errors: config.host.surface_command_errors,
        }
    }

    /// Uses `table` instead of the full host table, e.g. to offer fewer
    /// capabilities to plugins loaded afterwards.
    pub fn with_table(mut self, table: &'static CapabilityTable) -> Self {
        self.table = table;
        self
    }

    /// Adds a status sink.
    pub fn add_status_sink(&mut self, sink: Box<dyn StatusSink>) {
        self.state.status.add_sink(sink);
    }

    /// Loads a plugin by calling its entry point.
    ///
    /// The plugin may register commands and callbacks while the entry point
    /// runs; afterwards it is `Active`.
    pub fn load(&mut self, name: &str, init_fn: PluginInitFn) -> AppResult<PluginHandle> {
        if name.trim().is_empty() {
            return Err(AppError::validation("Plugin name is empty"));
        }
        if self.state.plugins.find_live(name).is_some() {
            return Err(AppError::conflict(format!(
                "Plugin '{name}' is already loaded"
            )));
        }

        let handle = self.state.plugins.reserve(name);
        self.set_state(handle, PluginState::Registered);

        let table = self.table;
        let userdata = {
            let mut scope = HostScope::new(handle, CallPhase::Init, &mut self.state);
            unsafe { init_fn(table, scope.handle()) }
        };

        let entry = self
            .state
            .plugins
            .get_mut(handle)
            .ok_or_else(|| AppError::internal(format!("Plugin slot {handle} vanished")))?;
        entry.userdata = userdata;
        entry.state = PluginState::Active;

        info!(
            plugin = %name,
            handle = %handle,
            commands = self.state.commands.count_for(handle),
            has_deinit = entry.deinit_fn.is_some(),
            has_event_handler = entry.event_handler_fn.is_some(),
            "Plugin loaded"
        );

        Ok(handle)
    }

    /// Runs a command line of the form `name[!] [args]`.
    pub fn run_line(&mut self, line: &str) -> AppResult<CommandOutcome> {
        let parsed = CommandLine::parse(line)
            .ok_or_else(|| AppError::validation("Command line is empty"))?;
        self.invoke_command(parsed.name, parsed.args, parsed.bang)
    }

    /// Invokes a registered command.
    ///
    /// A failure message returned by the plugin is copied before anything
    /// else happens and, if configured, written to the status bar.
    pub fn invoke_command(
        &mut self,
        name: &str,
        args: &str,
        bang: bool,
    ) -> AppResult<CommandOutcome> {
        let binding = self
            .state
            .commands
            .get(name)
            .ok_or_else(|| AppError::not_found(format!("Command '{name}' not found")))?;

        let (plugin_name, userdata) = self.active_entry(binding.plugin)?;

        debug!(plugin = %plugin_name, command = %name, bang, "Invoking command");

        let args = ByteSlice::borrowed(args.as_bytes());
        let ctx = CommandContext {
            args: args.raw(),
            bang,
        };
        let table = self.table;
        let message = {
            let mut scope = HostScope::new(binding.plugin, CallPhase::Command, &mut self.state);
            let result = unsafe { (binding.command_fn)(table, scope.handle(), &ctx, userdata) };
            helper::copy_message(result)
        };

        let outcome = match message {
            None => CommandOutcome::Completed {
                plugin: plugin_name,
            },
            Some(message) => {
                warn!(plugin = %plugin_name, command = %name, error = %message, "Command failed");
                if self.surface_command_errors {
                    self.state.status.write(StatusMessage::new(
                        StatusLevel::Error,
                        Some(&plugin_name),
                        message.clone(),
                    ));
                }
                CommandOutcome::Failed {
                    plugin: plugin_name,
                    message,
                }
            }
        };

        Ok(outcome)
    }

    /// Delivers an event to every active plugin with an event handler, in
    /// load order. Returns how many handlers ran.
    pub fn fire_event(&mut self) -> usize {
        let mut delivered = 0;
        for handle in self.state.plugins.handles_in(PluginState::Active) {
            if self.deliver_event(handle) {
                delivered += 1;
            }
        }
        debug!(delivered, "Event fired");
        delivered
    }

    /// Delivers an event to one plugin. Returns whether a handler ran.
    pub fn fire_event_for(&mut self, handle: PluginHandle) -> AppResult<bool> {
        self.active_entry(handle)?;
        Ok(self.deliver_event(handle))
    }

    /// Deinitializes a plugin. Its deinit function runs exactly once and
    /// nothing reaches the plugin afterwards.
    pub fn unload(&mut self, handle: PluginHandle) -> AppResult<()> {
        let entry = self
            .state
            .plugins
            .get_mut(handle)
            .ok_or_else(|| AppError::not_found(format!("Plugin {handle} not found")))?;
        if entry.state != PluginState::Active {
            return Err(AppError::not_found(format!(
                "Plugin '{}' is not active ({})",
                entry.name, entry.state
            )));
        }

        entry.state = PluginState::Deinitialized;
        let userdata = std::mem::replace(&mut entry.userdata, PluginUserData::null());
        let deinit_fn = entry.deinit_fn.take();
        entry.event_handler_fn = None;
        let name = entry.name.clone();

        let removed = self.state.commands.unregister_plugin(handle);

        if let Some(deinit_fn) = deinit_fn {
            unsafe { deinit_fn(userdata) };
        }

        info!(plugin = %name, handle = %handle, commands_removed = removed, "Plugin unloaded");
        Ok(())
    }

    /// Unloads every active plugin, most recently loaded first.
    pub fn unload_all(&mut self) {
        let handles: Vec<PluginHandle> = self.state.plugins.handles().rev().collect();
        for handle in handles {
            let active = self
                .state
                .plugins
                .get(handle)
                .is_some_and(|p| p.state == PluginState::Active);
            if !active {
                continue;
            }
            if let Err(e) = self.unload(handle) {
                error!(handle = %handle, error = %e, "Error unloading plugin");
            }
        }
    }

    /// Finds a live plugin by name.
    pub fn find(&self, name: &str) -> Option<PluginHandle> {
        self.state.plugins.find_live(name)
    }

    /// Summaries of every plugin ever loaded, in load order.
    pub fn plugins(&self) -> Vec<PluginInfo> {
        self.state
            .plugins
            .handles()
            .filter_map(|handle| {
                let entry = self.state.plugins.get(handle)?;
                Some(PluginInfo {
                    handle,
                    name: entry.name.clone(),
                    state: entry.state,
                    commands: self.state.commands.count_for(handle),
                    has_deinit: entry.deinit_fn.is_some(),
                    has_event_handler: entry.event_handler_fn.is_some(),
                })
            })
            .collect()
    }

    /// Registered commands, sorted by name.
    pub fn commands(&self) -> Vec<CommandInfo> {
        self.state
            .commands
            .iter()
            .map(|(name, binding)| CommandInfo {
                name: name.to_string(),
                plugin: self.state.plugins.name(binding.plugin).to_string(),
            })
            .collect()
    }

    /// The status bar.
    pub fn status(&self) -> &StatusBar {
        &self.state.status
    }

    fn set_state(&mut self, handle: PluginHandle, state: PluginState) {
        if let Some(entry) = self.state.plugins.get_mut(handle) {
            entry.state = state;
        }
    }

    fn active_entry(&self, handle: PluginHandle) -> AppResult<(String, PluginUserData)> {
        let entry = self
            .state
            .plugins
            .get(handle)
            .ok_or_else(|| AppError::not_found(format!("Plugin {handle} not found")))?;
        if entry.state != PluginState::Active {
            return Err(AppError::plugin(format!(
                "Plugin '{}' is {}",
                entry.name, entry.state
            )));
        }
        Ok((entry.name.clone(), entry.userdata))
    }

    fn deliver_event(&mut self, handle: PluginHandle) -> bool {
        let Some(entry) = self.state.plugins.get(handle) else {
            return false;
        };
        let Some(handler) = entry.event_handler_fn else {
            return false;
        };
        let userdata = entry.userdata;
        let table = self.table;
        let mut scope = HostScope::new(handle, CallPhase::Event, &mut self.state);
        unsafe { handler(table, scope.handle(), userdata) };
        true
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PluginManager {
    fn drop(&mut self) {
        self.unload_all();
    }
}

mod helper {
    use super::*;

    /// Copies a command's return value out of plugin memory.
    pub fn copy_message(result: ByteSlice) -> Option<String> {
        if result.is_empty() {
            return None;
        }
        // The plugin keeps the buffer alive until its next call.
        let bytes = unsafe { result.as_bytes() };
        Some(String::from_utf8_lossy(bytes).into_owned())
    }
}
