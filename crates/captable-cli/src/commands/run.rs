//! `run`: execute command lines in order.

use clap::Args;
use tracing::debug;

use captable_core::config::AppConfig;
use captable_core::error::AppError;

use crate::host;
use crate::output::{self, OutcomeRow, OutputFormat, RunReport};

/// Arguments for the run command
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Command lines of the form `name[!] [args]`
    #[arg(required = true)]
    pub commands: Vec<String>,
}

/// Execute the run command
pub async fn execute(
    args: &RunArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (rows, status) = host::with_host(config, |client| async move {
        let mut rows = Vec::with_capacity(args.commands.len());
        for line in &args.commands {
            let row = match client.run(line.as_str()).await {
                Ok(outcome) => OutcomeRow::from_outcome(line, &outcome),
                Err(e) => {
                    debug!(command = %line, error = %e, "Command rejected");
                    OutcomeRow::from_error(line, &e)
                }
            };
            rows.push(row);
        }
        Ok((rows, client.status().await?))
    })
    .await?;

    match format {
        OutputFormat::Table => {
            output::print_list(&rows, format);
            output::print_status(&status, format);
        }
        OutputFormat::Json => output::print_item(
            &RunReport {
                outcomes: &rows,
                status: &status,
            },
            format,
        ),
    }

    let failed = rows.iter().filter(|r| r.is_failure()).count();
    if failed > 0 {
        return Err(AppError::plugin(format!(
            "{failed} of {} command(s) failed",
            rows.len()
        )));
    }
    Ok(())
}
