//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "fleetsync",
    version,
    about = "Device lifecycle automation across registration, management, and directory systems",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct GlobalOpts {
    /// Output format.
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Remote API base URL.
    #[arg(
        long,
        global = true,
        env = "FLEETSYNC_BASE_URL",
        default_value = "https://graph.microsoft.com"
    )]
    pub base_url: String,

    /// Never prompt; assume yes on confirmations.
    #[arg(long, global = true)]
    pub yes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table.
    Table,
    /// JSON document.
    Json,
    /// One identifier per line.
    Plain,
}

#[derive(Subcommand)]
pub enum Command {
    /// Bulk-import device identities from a vendor CSV.
    Import(ImportArgs),

    /// Registered device identities (registration system).
    #[command(subcommand)]
    Autopilot(AutopilotCommand),

    /// Enrolled devices (management system).
    #[command(subcommand)]
    Devices(DevicesCommand),

    /// Remove a device from all three systems, in order.
    Offboard(OffboardArgs),

    /// Tenant credential settings.
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Show persisted workflow logs.
    Logs(LogsArgs),
}

#[derive(Args)]
pub struct ImportArgs {
    /// CSV file with Device Serial Number / Hardware Hash / Group Tag columns.
    pub file: PathBuf,

    /// Directory group to add each device to once it syncs.
    #[arg(long)]
    pub group_id: Option<String>,
}

#[derive(Subcommand)]
pub enum AutopilotCommand {
    /// List registered device identities.
    List,

    /// Delete a registered device identity and confirm its removal.
    Delete {
        /// Registration record id.
        id: String,
    },

    /// Show upload records and their import progress.
    ImportStatus,

    /// Remove an upload record that blocks re-importing a serial.
    DeleteImported {
        /// Upload record id.
        id: String,
    },
}

#[derive(Subcommand)]
pub enum DevicesCommand {
    /// List managed devices.
    List,

    /// Search managed devices by name or user principal.
    Search {
        term: String,
    },

    /// List devices that have not synced recently.
    Stale {
        /// Days since last sync before a device counts as stale.
        #[arg(long, default_value_t = 30)]
        days: i64,
    },

    /// Export managed devices to a CSV file.
    Export {
        file: PathBuf,
    },
}

#[derive(Args)]
pub struct OffboardArgs {
    /// Device name or user principal to search for.
    pub term: String,
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Show the configured credential pair (ids only, never secrets).
    Show,

    /// Store the credential pair, sealed at rest.
    Set {
        #[arg(long)]
        application_id: Option<String>,
        #[arg(long)]
        directory_id: Option<String>,
    },
}

#[derive(Args)]
pub struct LogsArgs {
    /// Which workflow context to show.
    #[arg(long, default_value = "engine")]
    pub context: String,
}
