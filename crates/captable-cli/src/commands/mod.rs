//! CLI command definitions and dispatch.

pub mod config;
pub mod event;
pub mod list;
pub mod run;
pub mod shell;

use clap::{Parser, Subcommand};

use captable_core::config::AppConfig;
use captable_core::error::AppError;
use captable_core::result::AppResult;

use crate::output::OutputFormat;

/// captable: run commands against plugins through a versioned capability table
#[derive(Debug, Parser)]
#[command(name = "captable", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay loaded next to the configuration file
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one or more commands, then print the status bar
    Run(run::RunArgs),
    /// Fire host events at every plugin
    Event(event::EventArgs),
    /// List loaded plugins
    Plugins,
    /// List registered commands
    Commands,
    /// Read commands from stdin
    Shell,
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Load configuration from the configured path and environment
    pub fn load_config(&self) -> AppResult<AppConfig> {
        AppConfig::load(&self.config, &self.env)
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: AppResult<AppConfig>) -> Result<(), AppError> {
        match &self.command {
            Commands::Run(args) => run::execute(args, &config?, self.format).await,
            Commands::Event(args) => event::execute(args, &config?, self.format).await,
            Commands::Plugins => list::plugins(&config?, self.format).await,
            Commands::Commands => list::commands(&config?, self.format).await,
            Commands::Shell => shell::execute(&config?, self.format).await,
            Commands::Config(args) => config::execute(args, &self.config, config, self.format),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from(["captable", "--format", "json", "run", "echo hi", "count"])
            .expect("valid arguments");
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config, "config/default.toml");
        match cli.command {
            Commands::Run(args) => assert_eq!(args.commands, ["echo hi", "count"]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_event_count() {
        let cli = Cli::try_parse_from(["captable", "event", "--count", "3"]).expect("valid");
        match cli.command {
            Commands::Event(args) => assert_eq!(args.count, 3),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_run_requires_a_command() {
        assert!(Cli::try_parse_from(["captable", "run"]).is_err());
    }
}
