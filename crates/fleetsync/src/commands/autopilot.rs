//! Registration-system command handlers.

use owo_colors::OwoColorize;
use tabled::Tabled;

use fleetsync_core::{DeletionOutcome, RegistrationRecord};

use crate::cli::{AutopilotCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output::{self, cell};

use super::Ctx;

#[derive(Tabled)]
struct RegisteredRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Manufacturer")]
    manufacturer: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Group Tag")]
    group_tag: String,
    #[tabled(rename = "Assignment")]
    assignment: String,
}

impl From<&RegistrationRecord> for RegisteredRow {
    fn from(record: &RegistrationRecord) -> Self {
        Self {
            id: record.id.clone(),
            serial: record.serial_number.clone(),
            manufacturer: cell(&record.manufacturer),
            model: cell(&record.model),
            group_tag: cell(&record.group_tag),
            assignment: format!("{:?}", record.assignment),
        }
    }
}

#[derive(Tabled)]
struct ImportStatusRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Imported")]
    imported: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub async fn handle(
    command: AutopilotCommand,
    ctx: &Ctx,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match command {
        AutopilotCommand::List => {
            let devices = ctx.engine.list_registered().await?;
            let rendered = output::render_list(
                global.output,
                &devices,
                |d| RegisteredRow::from(d),
                |d| d.id.clone(),
            );
            println!("{rendered}");
            Ok(())
        }

        AutopilotCommand::Delete { id } => delete(ctx, global, &id).await,

        AutopilotCommand::ImportStatus => {
            let records = ctx.engine.import_status().await?;
            let rendered = output::render_list(
                global.output,
                &records,
                |r| ImportStatusRow {
                    id: r.id.clone(),
                    serial: cell(&r.serial_number),
                    imported: r
                        .imported_date_time
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "-".into()),
                    status: r
                        .state
                        .as_ref()
                        .and_then(|s| {
                            s.device_error_name
                                .clone()
                                .or_else(|| s.device_import_status.clone())
                        })
                        .unwrap_or_else(|| "-".into()),
                },
                |r| r.id.clone(),
            );
            println!("{rendered}");
            Ok(())
        }

        AutopilotCommand::DeleteImported { id } => {
            ctx.engine.delete_imported(&id).await?;
            println!("Upload record {id} removed.");
            Ok(())
        }
    }
}

async fn delete(ctx: &Ctx, global: &GlobalOpts, id: &str) -> Result<(), CliError> {
    if !global.yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!(
                "Delete registration record {id}? This cannot be undone"
            ))
            .default(false)
            .interact()
            .map_err(|e| CliError::Usage {
                message: format!("confirmation failed: {e}"),
            })?;
        if !confirmed {
            return Err(CliError::Cancelled);
        }
    }

    let outcome = ctx.engine.delete_registration(id).await?;

    if global.output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&outcome).map_err(std::io::Error::from)?);
        return Ok(());
    }

    match outcome {
        DeletionOutcome::Confirmed { attempts } => {
            println!(
                "{} removed (confirmed after {attempts} check{})",
                id.green(),
                if attempts == 1 { "" } else { "s" }
            );
        }
        DeletionOutcome::Unconfirmed { .. } => {
            println!(
                "{}",
                format!(
                    "Deletion of {id} initiated. The record can take up to 30 minutes to \
                     disappear; re-run `fleetsync autopilot list` to verify."
                )
                .yellow()
            );
        }
        DeletionOutcome::InProgress => {
            println!(
                "{}",
                format!(
                    "A deletion of {id} is already in progress remotely. Wait and refresh \
                     before retrying."
                )
                .yellow()
            );
        }
        DeletionOutcome::AlreadyAbsent => {
            println!("{id} was already absent — nothing to do.");
        }
        DeletionOutcome::AlreadyDeleting => {
            println!(
                "{}",
                format!("A deletion of {id} is already running in this session.").yellow()
            );
        }
    }
    Ok(())
}
