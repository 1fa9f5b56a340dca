//! `event`: fire host events.

use clap::Args;

use captable_core::config::AppConfig;
use captable_core::error::AppError;

use crate::host;
use crate::output::{self, EventReport, OutputFormat};

/// Arguments for the event command
#[derive(Debug, Args)]
pub struct EventArgs {
    /// Number of events to fire
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: u32,
}

/// Execute the event command
pub async fn execute(
    args: &EventArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (handled, status) = host::with_host(config, |client| async move {
        let mut handled = 0;
        for _ in 0..args.count {
            handled += client.fire_event().await?;
        }
        Ok((handled, client.status().await?))
    })
    .await?;

    match format {
        OutputFormat::Table => {
            output::print_success(&format!(
                "{} event(s) fired, {handled} handler call(s)",
                args.count
            ));
            output::print_status(&status, format);
        }
        OutputFormat::Json => output::print_item(
            &EventReport {
                events: args.count,
                handled,
                status: &status,
            },
            format,
        ),
    }
    Ok(())
}
