//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use captable_host::{CommandOutcome, StatusMessage};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Print a single item in the selected format
pub fn print_item<T: Serialize + std::fmt::Debug>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{item:#?}"),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{key}:"), value);
}

/// Command outcome display row
#[derive(Debug, Serialize, Tabled)]
pub struct OutcomeRow {
    /// Command line as typed
    pub command: String,
    /// completed, failed or error
    pub outcome: String,
    /// Owning plugin
    pub plugin: String,
    /// Failure or error message
    pub message: String,
}

impl OutcomeRow {
    /// Row for a command that reached a plugin.
    pub fn from_outcome(command: &str, outcome: &CommandOutcome) -> Self {
        match outcome {
            CommandOutcome::Completed { plugin } => Self {
                command: command.to_string(),
                outcome: "completed".to_string(),
                plugin: plugin.clone(),
                message: String::new(),
            },
            CommandOutcome::Failed { plugin, message } => Self {
                command: command.to_string(),
                outcome: "failed".to_string(),
                plugin: plugin.clone(),
                message: message.clone(),
            },
        }
    }

    /// Row for a command the host refused.
    pub fn from_error(command: &str, error: &captable_core::AppError) -> Self {
        Self {
            command: command.to_string(),
            outcome: "error".to_string(),
            plugin: String::new(),
            message: error.to_string(),
        }
    }

    /// Returns `true` unless the command completed.
    pub fn is_failure(&self) -> bool {
        self.outcome != "completed"
    }
}

/// Status bar display row
#[derive(Debug, Serialize, Tabled)]
pub struct StatusRow {
    /// Time written
    pub time: String,
    /// Level
    pub level: String,
    /// Writing plugin, or `host`
    pub source: String,
    /// Message text
    pub text: String,
}

impl From<&StatusMessage> for StatusRow {
    fn from(message: &StatusMessage) -> Self {
        Self {
            time: message.written_at.format("%H:%M:%S%.3f").to_string(),
            level: message.level.to_string(),
            source: message.source.clone().unwrap_or_else(|| "host".to_string()),
            text: message.text.clone(),
        }
    }
}

/// Print the status bar, oldest message first.
pub fn print_status(messages: &[StatusMessage], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let rows: Vec<StatusRow> = messages.iter().map(StatusRow::from).collect();
            if !rows.is_empty() {
                println!("{}", Table::new(&rows));
            }
        }
        OutputFormat::Json => print_item(&messages, format),
    }
}

/// JSON document printed by `run`.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    /// One entry per command line, in order
    pub outcomes: &'a [OutcomeRow],
    /// Status bar after the last command
    pub status: &'a [StatusMessage],
}

/// JSON document printed by `event`.
#[derive(Debug, Serialize)]
pub struct EventReport<'a> {
    /// Events fired
    pub events: u32,
    /// Handler calls across all events
    pub handled: usize,
    /// Status bar after the last event
    pub status: &'a [StatusMessage],
}
