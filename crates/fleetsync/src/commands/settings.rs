//! Credential settings command.

use fleetsync_config::{Credentials, SettingsStore};

use crate::cli::SettingsCommand;
use crate::error::CliError;

pub fn handle(command: SettingsCommand, store: &SettingsStore) -> Result<(), CliError> {
    match command {
        SettingsCommand::Show => {
            let credentials = store.load()?;
            let shown = |v: &str| {
                if v.is_empty() {
                    "(not set)".to_owned()
                } else {
                    v.to_owned()
                }
            };
            println!("Settings file:   {}", store.path().display());
            println!("Application id:  {}", shown(&credentials.application_id));
            println!("Directory id:    {}", shown(&credentials.directory_id));
            println!(
                "Usable:          {}",
                if credentials.is_complete() { "yes" } else { "no" }
            );
            Ok(())
        }

        SettingsCommand::Set {
            application_id,
            directory_id,
        } => {
            if application_id.is_none() && directory_id.is_none() {
                return Err(CliError::Usage {
                    message: "provide --application-id and/or --directory-id".into(),
                });
            }

            let current = store.load().unwrap_or_else(|_| Credentials::default());
            let updated = Credentials {
                application_id: application_id.unwrap_or(current.application_id),
                directory_id: directory_id.unwrap_or(current.directory_id),
            };
            store.save(&updated)?;
            println!("Settings saved to {}", store.path().display());
            Ok(())
        }
    }
}
