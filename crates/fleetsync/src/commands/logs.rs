//! Persisted workflow log display.

use owo_colors::OwoColorize;

use fleetsync_config::SettingsStore;
use fleetsync_core::{LogBuffer, LogLevel};

use crate::cli::LogsArgs;
use crate::error::CliError;

pub fn handle(args: &LogsArgs, store: &SettingsStore) -> Result<(), CliError> {
    let path = store.log_path(&args.context);
    if !path.exists() {
        println!("No persisted logs for context '{}'.", args.context);
        return Ok(());
    }

    let records = LogBuffer::load(&path)?;
    for record in records {
        let level = match record.level {
            LogLevel::Debug => "debug".dimmed().to_string(),
            LogLevel::Info => "info ".to_string(),
            LogLevel::Warn => "warn ".yellow().to_string(),
            LogLevel::Error => "error".red().to_string(),
            LogLevel::Success => "ok   ".green().to_string(),
        };
        print!(
            "{} [{level}] {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.message
        );
        if let Some(error) = &record.error {
            print!(" — {error}");
        }
        println!();
    }
    Ok(())
}
