//! Management-system command handlers.

use std::fs::File;

use tabled::Tabled;

use fleetsync_core::{csvio, ManagementRecord};

use crate::cli::{DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, cell};

use super::Ctx;

#[derive(Tabled)]
struct ManagedRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "OS")]
    os: String,
    #[tabled(rename = "Compliance")]
    compliance: String,
    #[tabled(rename = "Last Sync")]
    last_sync: String,
}

impl From<&ManagementRecord> for ManagedRow {
    fn from(record: &ManagementRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: cell(&record.name),
            user: cell(&record.user_principal_name),
            os: cell(&record.operating_system),
            compliance: format!("{:?}", record.compliance),
            last_sync: record
                .last_sync
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "never".into()),
        }
    }
}

fn print_devices(devices: &[ManagementRecord], global: &GlobalOpts) {
    let rendered = output::render_list(global.output, devices, |d| ManagedRow::from(d), |d| d.id.clone());
    println!("{rendered}");
}

pub async fn handle(
    command: DevicesCommand,
    ctx: &Ctx,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match command {
        DevicesCommand::List => {
            let devices = ctx.engine.list_managed().await?;
            print_devices(&devices, global);
            Ok(())
        }

        DevicesCommand::Search { term } => {
            let devices = ctx.engine.search_managed(&term).await?;
            if devices.is_empty() {
                return Err(CliError::NoMatch { term });
            }
            print_devices(&devices, global);
            Ok(())
        }

        DevicesCommand::Stale { days } => {
            let devices = ctx.engine.stale_managed(days).await?;
            println!("{} device(s) stale beyond {days} days", devices.len());
            print_devices(&devices, global);
            Ok(())
        }

        DevicesCommand::Export { file } => {
            let devices = ctx.engine.list_managed().await?;
            let out = File::create(&file)?;
            csvio::export_records(out, &devices).map_err(CliError::from)?;
            println!("Exported {} device(s) to {}", devices.len(), file.display());
            Ok(())
        }
    }
}
