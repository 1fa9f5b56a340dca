//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use captable_core::config::AppConfig;
use captable_core::error::AppError;
use captable_core::result::AppResult;

use crate::host::builtin_plugins;
use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate the configuration
    Validate,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    config_path: &str,
    config: AppResult<AppConfig>,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = config?;
            output::print_item(&config, format);
        }
        ConfigCommand::Validate => match config {
            Ok(config) => {
                output::print_success(&format!("Configuration '{config_path}' is valid"));
                output::print_kv("Status history", &config.host.status_history.to_string());
                output::print_kv(
                    "Surface failures",
                    &config.host.surface_command_errors.to_string(),
                );
                output::print_kv("Request queue", &config.host.request_queue.to_string());
                output::print_kv("Plugins", &enabled_plugins(&config).join(", "));
                output::print_kv(
                    "Logging",
                    &format!("{} ({})", config.logging.level, config.logging.format),
                );
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }

    Ok(())
}

/// Built-in plugins the configuration enables.
fn enabled_plugins(config: &AppConfig) -> Vec<&'static str> {
    builtin_plugins()
        .into_iter()
        .map(|(name, _)| name)
        .filter(|name| config.plugins.is_enabled(name))
        .collect()
}
