// ── Core error types ──
//
// Workflow-level failures. Remote API errors pass through transparently
// (payload intact) because every remote detail must stay displayable;
// only genuinely new failure modes get their own variants.

use thiserror::Error;

use fleetsync_api::ApiErrorKind;

use crate::auth::AuthError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Remote API failure, payload preserved verbatim.
    #[error(transparent)]
    Api(#[from] fleetsync_api::Error),

    /// Token acquisition failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A specific import row is unusable.
    #[error("CSV row {row}: {message}")]
    CsvRow { row: usize, message: String },

    /// The import file itself is malformed.
    #[error("CSV parse error: {0}")]
    CsvParse(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Classification of the underlying remote failure, if there is one.
    pub fn api_kind(&self) -> Option<ApiErrorKind> {
        match self {
            Self::Api(e) => Some(e.classify()),
            _ => None,
        }
    }
}
