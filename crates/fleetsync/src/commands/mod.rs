//! Command handlers.

pub mod autopilot;
pub mod devices;
pub mod import;
pub mod logs;
pub mod offboard;
pub mod settings;

use fleetsync_config::SettingsStore;
use fleetsync_core::Engine;

use crate::auth::CliTokenSource;
use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Everything a connected command needs.
pub struct Ctx {
    pub engine: Engine<CliTokenSource>,
    pub store: SettingsStore,
}

/// The log-buffer context a command's engine records under.
pub fn log_context(command: &Command) -> &'static str {
    match command {
        Command::Import(_) => "import",
        Command::Autopilot(_) => "autopilot",
        Command::Devices(_) => "devices",
        Command::Offboard(_) => "offboard",
        Command::Settings(_) | Command::Logs(_) => "engine",
    }
}

pub async fn dispatch(command: Command, ctx: &Ctx, global: &GlobalOpts) -> Result<(), CliError> {
    match command {
        Command::Import(args) => import::handle(args, ctx, global).await,
        Command::Autopilot(cmd) => autopilot::handle(cmd, ctx, global).await,
        Command::Devices(cmd) => devices::handle(cmd, ctx, global).await,
        Command::Offboard(args) => offboard::handle(args, ctx, global).await,
        // Handled in main without a connection.
        Command::Settings(_) | Command::Logs(_) => unreachable!("handled before dispatch"),
    }
}
