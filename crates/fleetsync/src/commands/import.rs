//! Bulk import command.

use std::fs::File;
use std::io::BufReader;

use owo_colors::OwoColorize;

use fleetsync_core::csvio;
use fleetsync_core::engine::AssignmentOutcome;
use fleetsync_core::ImportOptions;

use crate::cli::{GlobalOpts, ImportArgs, OutputFormat};
use crate::error::CliError;

use super::Ctx;

pub async fn handle(args: ImportArgs, ctx: &Ctx, global: &GlobalOpts) -> Result<(), CliError> {
    let file = File::open(&args.file)?;
    let rows = csvio::parse_import_rows(BufReader::new(file)).map_err(CliError::from)?;
    if rows.is_empty() {
        return Err(CliError::Usage {
            message: format!("{} contains no data rows", args.file.display()),
        });
    }

    println!(
        "Uploading {} device(s) from {}{}",
        rows.len(),
        args.file.display(),
        args.group_id
            .as_deref()
            .map(|g| format!(", then assigning to group {g}"))
            .unwrap_or_default()
    );

    let summary = ctx
        .engine
        .run_import(
            rows,
            ImportOptions {
                group_id: args.group_id,
            },
        )
        .await?;

    if global.output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&summary).map_err(std::io::Error::from)?);
        return Ok(());
    }

    println!();
    if summary.registration_confirmed && summary.failed == 0 {
        println!("{}", "Upload complete — all devices registered".green().bold());
    } else if summary.uploaded > 0 && !summary.registration_confirmed {
        println!(
            "{}",
            "Upload complete — registration pending (devices typically appear within 5-10 \
             minutes; re-run `fleetsync autopilot list` to check)"
                .yellow()
                .bold()
        );
    } else {
        println!("{}", "Upload finished with failures".red().bold());
    }

    println!("  Total:    {}", summary.total);
    println!("  Uploaded: {}", summary.uploaded);
    println!("  Failed:   {}", summary.failed);

    for row in summary.rows.iter().filter(|r| !r.accepted) {
        println!(
            "  {} {}: {}",
            "✗".red(),
            row.serial_number,
            row.error.as_deref().unwrap_or("unknown error")
        );
    }

    if let Some(group) = &summary.group {
        println!();
        println!(
            "Group {}: {} added, {} failed{}",
            group.group_id,
            group.added(),
            group.failed(),
            if group.sync_confirmed {
                String::new()
            } else {
                " (directory sync incomplete)".to_owned()
            }
        );
        for assignment in &group.assignments {
            match &assignment.outcome {
                AssignmentOutcome::Added => {}
                AssignmentOutcome::NoCrossReference => println!(
                    "  {} {}: no directory cross-reference appeared",
                    "✗".red(),
                    assignment.serial_number
                ),
                AssignmentOutcome::Failed { message } => println!(
                    "  {} {}: {message}",
                    "✗".red(),
                    assignment.serial_number
                ),
            }
        }
    }

    Ok(())
}
