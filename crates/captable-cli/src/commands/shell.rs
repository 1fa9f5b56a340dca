//! `shell`: read command lines from stdin.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use captable_core::config::AppConfig;
use captable_core::error::AppError;
use captable_host::HostClient;

use crate::host;
use crate::output::{self, OutcomeRow, OutputFormat};

const HELP: &str = "\
  <name>[!] [args]   run a command
  :event             fire an event
  :status            show the status bar
  :plugins           list plugins
  :commands          list commands
  :help              show this help
  :quit              exit";

/// What a shell line asks for.
#[derive(Debug, PartialEq, Eq)]
enum ShellLine<'a> {
    Empty,
    Command(&'a str),
    Event,
    Status,
    Plugins,
    Commands,
    Help,
    Quit,
    Unknown(&'a str),
}

impl<'a> ShellLine<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line {
            "" => Self::Empty,
            ":event" => Self::Event,
            ":status" => Self::Status,
            ":plugins" => Self::Plugins,
            ":commands" => Self::Commands,
            ":help" => Self::Help,
            ":quit" | ":q" => Self::Quit,
            _ if line.starts_with(':') => Self::Unknown(line),
            _ => Self::Command(line),
        }
    }
}

/// Execute the shell command
pub async fn execute(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    host::with_host(config, |client| async move { repl(&client, format).await }).await
}

async fn repl(client: &HostClient, format: OutputFormat) -> Result<(), AppError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match ShellLine::parse(&line) {
            ShellLine::Empty => {}
            ShellLine::Quit => break,
            ShellLine::Help => println!("{HELP}"),
            ShellLine::Event => {
                let handled = client.fire_event().await?;
                output::print_success(&format!("{handled} handler call(s)"));
            }
            ShellLine::Status => output::print_status(&client.status().await?, format),
            ShellLine::Plugins => {
                let plugins = client.plugins().await?;
                let names: Vec<_> = plugins.iter().map(|p| p.name.as_str()).collect();
                println!("{}", names.join(" "));
            }
            ShellLine::Commands => {
                let commands = client.commands().await?;
                let names: Vec<_> = commands.iter().map(|c| c.name.as_str()).collect();
                println!("{}", names.join(" "));
            }
            ShellLine::Unknown(line) => {
                output::print_error(&format!("Unknown shell command '{line}'"));
            }
            ShellLine::Command(line) => {
                let row = match client.run(line).await {
                    Ok(outcome) => OutcomeRow::from_outcome(line, &outcome),
                    Err(e) => {
                        debug!(command = %line, error = %e, "Command rejected");
                        OutcomeRow::from_error(line, &e)
                    }
                };
                print_row(&row, format);
            }
        }
    }
    Ok(())
}

fn print_row(row: &OutcomeRow, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_item(row, format),
        OutputFormat::Table if row.is_failure() => output::print_error(&row.message),
        OutputFormat::Table => {
            output::print_success(&format!("{} ({})", row.command, row.plugin));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shell_lines() {
        assert_eq!(ShellLine::parse("   "), ShellLine::Empty);
        assert_eq!(ShellLine::parse(":event"), ShellLine::Event);
        assert_eq!(ShellLine::parse(" :quit "), ShellLine::Quit);
        assert_eq!(ShellLine::parse(":nope"), ShellLine::Unknown(":nope"));
        assert_eq!(ShellLine::parse("echo! hi "), ShellLine::Command("echo! hi"));
    }
}
