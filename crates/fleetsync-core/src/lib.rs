//! Reconciliation engine and business logic for fleetsync.
//!
//! Three remote systems -- registration, management, and directory --
//! hold loosely-coupled views of the same device fleet behind a
//! paginated, eventually-consistent REST API. This crate owns the
//! logic that makes lifecycle operations trustworthy anyway:
//!
//! - **[`Engine`]** — multi-step workflows (bulk import, confirmed
//!   deletion, cross-system offboarding) built on bounded polling and
//!   explicit confirmed/unconfirmed terminal states.
//! - **[`poll`]** — the polling loop as data ({interval, ceiling}) with
//!   a pluggable sleeper, so tests drive it without a clock.
//! - **[`model`]** / [`normalize`] — canonical records; field-synonym
//!   normalization happens once at the conversion boundary.
//! - **[`auth`]** — the token-acquisition port with
//!   silent-then-interactive fallback.
//! - **[`csvio`]** — vendor CSV import and CRLF export.
//! - **[`logbuf`]** — bounded, per-context structured log buffers.

pub mod auth;
pub mod convert;
pub mod csvio;
pub mod engine;
pub mod error;
pub mod logbuf;
pub mod model;
pub mod normalize;
pub mod poll;

pub use auth::{AuthError, StaticTokenSource, TokenSource, acquire_with_fallback};
pub use csvio::ImportRow;
pub use engine::{
    AssignmentOutcome, DeletionOutcome, DevicePresence, Engine, GroupReport, ImportOptions,
    ImportSummary, OffboardReport, PollSettings, StepOutcome,
};
pub use error::CoreError;
pub use logbuf::{LogBuffer, LogLevel, LogRecord};
pub use model::{
    AssignmentStatus, ComplianceState, DirectoryRecord, ManagementRecord, RegistrationRecord,
};
pub use poll::{PollOutcome, PollPlan, Sleeper, TokioSleeper};
