mod auth;
mod cli;
mod commands;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fleetsync_api::{GraphClient, TransportConfig};
use fleetsync_config::SettingsStore;
use fleetsync_core::{Engine, LogBuffer};

use crate::auth::CliTokenSource;
use crate::cli::{Cli, Command};
use crate::commands::Ctx;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let store = SettingsStore::open_default()?;

    match cli.command {
        // Local-only commands need no connection or token.
        Command::Settings(cmd) => commands::settings::handle(cmd, &store),
        Command::Logs(args) => commands::logs::handle(&args, &store),

        command => {
            let tokens = CliTokenSource::new(store.has_valid_credentials());
            if !fleetsync_core::TokenSource::has_valid_credentials(&tokens) {
                return Err(CliError::NoCredentials);
            }

            let client = GraphClient::new(&cli.global.base_url, &TransportConfig::default())
                .map_err(|e| CliError::Usage {
                    message: format!("invalid base URL: {e}"),
                })?;

            let context = commands::log_context(&command);
            let log = Arc::new(LogBuffer::new(context));
            let engine = Engine::new(Arc::new(client), tokens).with_log(Arc::clone(&log));

            let ctx = Ctx { engine, store };
            let result = commands::dispatch(command, &ctx, &cli.global).await;

            // Persist the workflow log regardless of the outcome.
            if let Err(e) = log.save(&ctx.store.log_path(context)) {
                tracing::warn!(error = %e, "failed to persist workflow log");
            }

            result
        }
    }
}
