//! `plugins` and `commands`: inspect what is loaded.

use serde::Serialize;
use tabled::Tabled;

use captable_core::config::AppConfig;
use captable_core::error::AppError;
use captable_host::{CommandInfo, PluginInfo};

use crate::host;
use crate::output::{self, OutputFormat};

/// Plugin display row
#[derive(Debug, Serialize, Tabled)]
struct PluginRow {
    /// Load handle
    handle: String,
    /// Name
    name: String,
    /// Lifecycle state
    state: String,
    /// Registered commands
    commands: usize,
    /// Deinit function set
    deinit: bool,
    /// Event handler set
    events: bool,
}

impl From<PluginInfo> for PluginRow {
    fn from(info: PluginInfo) -> Self {
        Self {
            handle: info.handle.to_string(),
            name: info.name,
            state: info.state.to_string(),
            commands: info.commands,
            deinit: info.has_deinit,
            events: info.has_event_handler,
        }
    }
}

/// Command display row
#[derive(Debug, Serialize, Tabled)]
struct CommandRow {
    /// Command name
    name: String,
    /// Owning plugin
    plugin: String,
}

impl From<CommandInfo> for CommandRow {
    fn from(info: CommandInfo) -> Self {
        Self {
            name: info.name,
            plugin: info.plugin,
        }
    }
}

/// List loaded plugins
pub async fn plugins(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let plugins = host::with_host(config, |client| async move { client.plugins().await }).await?;
    let rows: Vec<PluginRow> = plugins.into_iter().map(PluginRow::from).collect();
    output::print_list(&rows, format);
    Ok(())
}

/// List registered commands
pub async fn commands(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let commands = host::with_host(config, |client| async move { client.commands().await }).await?;
    let rows: Vec<CommandRow> = commands.into_iter().map(CommandRow::from).collect();
    output::print_list(&rows, format);
    Ok(())
}
