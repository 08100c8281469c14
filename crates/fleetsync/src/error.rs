//! CLI error types with miette diagnostics.
//!
//! Maps core errors into user-facing diagnostics with actionable help
//! text and distinct exit codes, keeping remote error detail visible.

use miette::Diagnostic;
use thiserror::Error;

use fleetsync_api::ApiErrorKind;
use fleetsync_core::CoreError;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("No credentials configured")]
    #[diagnostic(
        code(fleetsync::no_credentials),
        help(
            "Store the tenant credential pair first:\n  \
             fleetsync settings set --application-id <id> --directory-id <id>\n\
             Or export FLEETSYNC_APPLICATION_ID / FLEETSYNC_DIRECTORY_ID."
        )
    )]
    NoCredentials,

    #[error("Authentication failed")]
    #[diagnostic(
        code(fleetsync::auth_failed),
        help("Provide a token via FLEETSYNC_ACCESS_TOKEN or re-run to be prompted.")
    )]
    AuthFailed {
        #[source]
        source: fleetsync_core::AuthError,
    },

    #[error("The token lacks a required permission scope")]
    #[diagnostic(
        code(fleetsync::permission_denied),
        help("Grant the listed scope to the application registration, then retry.\n{detail}")
    )]
    PermissionDenied { detail: String },

    #[error("{resource} '{identifier}' not found")]
    #[diagnostic(code(fleetsync::not_found))]
    NotFound {
        resource: &'static str,
        identifier: String,
    },

    #[error("No devices matched '{term}'")]
    #[diagnostic(
        code(fleetsync::no_match),
        help("Search matches device name and user principal, case-insensitively.")
    )]
    NoMatch { term: String },

    #[error("Cancelled")]
    #[diagnostic(code(fleetsync::cancelled))]
    Cancelled,

    #[error(transparent)]
    #[diagnostic(code(fleetsync::core))]
    Core(CoreError),

    #[error(transparent)]
    #[diagnostic(code(fleetsync::config))]
    Config(#[from] fleetsync_config::ConfigError),

    #[error("I/O error: {0}")]
    #[diagnostic(code(fleetsync::io))]
    Io(#[from] std::io::Error),

    #[error("{message}")]
    #[diagnostic(code(fleetsync::usage))]
    Usage { message: String },
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Auth(source) => Self::AuthFailed { source },
            other => match other.api_kind() {
                Some(ApiErrorKind::PermissionDenied) => Self::PermissionDenied {
                    detail: other.to_string(),
                },
                _ => Self::Core(other),
            },
        }
    }
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoCredentials | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } | Self::NoMatch { .. } => exit_code::NOT_FOUND,
            Self::Usage { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}
