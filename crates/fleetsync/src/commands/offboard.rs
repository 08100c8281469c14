//! Offboarding command: search, pre-flight, confirm, run.

use owo_colors::OwoColorize;

use fleetsync_core::engine::StepOutcome;
use fleetsync_core::{DevicePresence, ManagementRecord};

use crate::cli::{GlobalOpts, OffboardArgs, OutputFormat};
use crate::error::CliError;

use super::Ctx;

pub async fn handle(args: OffboardArgs, ctx: &Ctx, global: &GlobalOpts) -> Result<(), CliError> {
    let matches = ctx.engine.search_managed(&args.term).await?;
    let device = pick_device(matches, &args.term, global)?;

    println!(
        "Checking {} across all three systems...",
        device.name.as_deref().unwrap_or(&device.id)
    );
    let presence = ctx.engine.check_presence(&device.id).await?;
    print_presence(&presence);

    if !presence.any() {
        println!("Device not present in any system — nothing to offboard.");
        return Ok(());
    }

    if !global.yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt("Offboard this device? Deletions cannot be undone")
            .default(false)
            .interact()
            .map_err(|e| CliError::Usage {
                message: format!("confirmation failed: {e}"),
            })?;
        if !confirmed {
            return Err(CliError::Cancelled);
        }
    }

    let report = ctx.engine.offboard(&presence).await?;

    if global.output == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?);
        return Ok(());
    }

    println!();
    print_step("Management", &report.management);
    print_step("Registration", &report.registration);
    print_step("Directory", &report.directory);
    if report.aborted {
        println!(
            "{}",
            "Aborted after the management step failed; the registration and directory \
             records were left untouched."
                .red()
        );
    }
    Ok(())
}

fn pick_device(
    mut matches: Vec<ManagementRecord>,
    term: &str,
    global: &GlobalOpts,
) -> Result<ManagementRecord, CliError> {
    match matches.len() {
        0 => Err(CliError::NoMatch {
            term: term.to_owned(),
        }),
        1 => Ok(matches.remove(0)),
        _ if global.yes => Err(CliError::Usage {
            message: format!(
                "{} devices match '{term}'; narrow the search when using --yes",
                matches.len()
            ),
        }),
        _ => {
            let labels: Vec<String> = matches
                .iter()
                .map(|d| {
                    format!(
                        "{} ({})",
                        d.name.as_deref().unwrap_or(&d.id),
                        d.user_principal_name.as_deref().unwrap_or("no user")
                    )
                })
                .collect();
            let index = dialoguer::Select::new()
                .with_prompt("Multiple devices match; pick one")
                .items(&labels)
                .default(0)
                .interact()
                .map_err(|e| CliError::Usage {
                    message: format!("selection failed: {e}"),
                })?;
            Ok(matches.remove(index))
        }
    }
}

fn print_presence(presence: &DevicePresence) {
    let status = |present: bool| {
        if present {
            "registered".green().to_string()
        } else {
            "not found".dimmed().to_string()
        }
    };
    println!("  Management:   {}", status(presence.management.is_some()));
    println!("  Registration: {}", status(presence.registration.is_some()));
    println!("  Directory:    {}", status(presence.directory.is_some()));
}

fn print_step(label: &str, outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Skipped => println!("  {} {label}: skipped", "·".dimmed()),
        StepOutcome::Deleted => println!("  {} {label}: deleted", "✓".green()),
        StepOutcome::AlreadyAbsent => {
            println!("  {} {label}: already absent", "✓".green());
        }
        StepOutcome::Failed { message } => {
            println!("  {} {label}: {message}", "✗".red());
        }
    }
}
