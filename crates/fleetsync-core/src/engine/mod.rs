// ── Reconciliation engine ──
//
// Drives multi-step workflows across the three remote systems: bulk
// import, deletion-with-confirmation, and full offboarding. The remote
// gives no synchronous confirmation for most mutations, so every
// workflow bridges "request accepted" to "state observable" with
// bounded polling and reports an explicit confirmed/unconfirmed
// terminal state -- never a guess.

mod deletion;
mod import;
mod offboard;

pub use deletion::DeletionOutcome;
pub use import::{
    AssignmentOutcome, GroupAssignment, GroupReport, ImportOptions, ImportSummary, RowOutcome,
};
pub use offboard::{DevicePresence, OffboardReport, StepOutcome};

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use secrecy::SecretString;

use fleetsync_api::types::ImportedDevice;
use fleetsync_api::{AutopilotOps, DirectoryOps, GraphClient, IntuneOps};

use crate::auth::{AuthError, TokenSource, acquire_with_fallback, scopes};
use crate::error::CoreError;
use crate::logbuf::LogBuffer;
use crate::model::{ManagementRecord, RegistrationRecord};
use crate::poll::{PollPlan, Sleeper, TokioSleeper};

/// Poll plans per confirmation loop. Ceilings differ deliberately:
/// directory sync is known to lag much further behind a registration
/// becoming visible, so its budget is the largest.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    /// Uploaded serials appearing in the registration listing.
    pub registration: PollPlan,
    /// A deleted id disappearing from the registration listing.
    pub removal: PollPlan,
    /// Cross-reference ids getting populated after registration.
    pub directory_sync: PollPlan,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            registration: PollPlan::new(Duration::from_secs(10), 24),
            removal: PollPlan::new(Duration::from_secs(5), 6),
            directory_sync: PollPlan::new(Duration::from_secs(10), 36),
        }
    }
}

/// The reconciliation engine.
///
/// One instance per session. Holds no shared mutable state between
/// concurrently running workflows beyond the in-flight deletion
/// markers, so independent workflows can run as independent tasks.
pub struct Engine<S> {
    pub(crate) autopilot: AutopilotOps,
    pub(crate) intune: IntuneOps,
    pub(crate) directory: DirectoryOps,
    tokens: S,
    pub(crate) polls: PollSettings,
    pub(crate) sleeper: Arc<dyn Sleeper>,
    pub(crate) log: Arc<LogBuffer>,
    /// Device ids with a deletion currently in flight in this session.
    /// Cleared on every terminal state.
    pub(crate) deletions_in_flight: DashMap<String, ()>,
}

impl<S: TokenSource> Engine<S> {
    pub fn new(client: Arc<GraphClient>, tokens: S) -> Self {
        Self {
            autopilot: AutopilotOps::new(Arc::clone(&client)),
            intune: IntuneOps::new(Arc::clone(&client)),
            directory: DirectoryOps::new(client),
            tokens,
            polls: PollSettings::default(),
            sleeper: Arc::new(TokioSleeper),
            log: Arc::new(LogBuffer::new("engine")),
            deletions_in_flight: DashMap::new(),
        }
    }

    /// Override the poll plans (tests, impatient operators).
    pub fn with_polls(mut self, polls: PollSettings) -> Self {
        self.polls = polls;
        self
    }

    /// Override the sleeper (tests inject a clockless one).
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Attach a log buffer (one per subsystem context).
    pub fn with_log(mut self, log: Arc<LogBuffer>) -> Self {
        self.log = log;
        self
    }

    /// Acquire a token for one workflow stage.
    ///
    /// Fetched fresh per stage that needs a new scope set; the silent
    /// flow falls back to interactive only on an interaction-required
    /// condition.
    pub(crate) async fn token(&self, stage_scopes: &[&str]) -> Result<SecretString, CoreError> {
        if !self.tokens.has_valid_credentials() {
            return Err(AuthError::NotConfigured.into());
        }
        Ok(acquire_with_fallback(&self.tokens, stage_scopes).await?)
    }

    // ── Listings ─────────────────────────────────────────────────────

    pub async fn list_registered(&self) -> Result<Vec<RegistrationRecord>, CoreError> {
        let token = self.token(&[scopes::SERVICE_CONFIG]).await?;
        let raw = self.autopilot.list(&token).await?;
        Ok(raw.into_iter().map(RegistrationRecord::from).collect())
    }

    pub async fn list_managed(&self) -> Result<Vec<ManagementRecord>, CoreError> {
        let token = self.token(&[scopes::MANAGED_DEVICES]).await?;
        let raw = self.intune.list(&token).await?;
        Ok(raw.into_iter().map(ManagementRecord::from).collect())
    }

    /// Upload records with their import progress.
    pub async fn import_status(&self) -> Result<Vec<ImportedDevice>, CoreError> {
        let token = self.token(&[scopes::SERVICE_CONFIG]).await?;
        Ok(self.autopilot.import_status(&token).await?)
    }

    /// Remove an upload record (not the registered identity itself).
    /// Useful when a rejected import blocks re-uploading a serial.
    pub async fn delete_imported(&self, id: &str) -> Result<(), CoreError> {
        let token = self.token(&[scopes::SERVICE_CONFIG]).await?;
        self.autopilot.delete_imported(&token, id).await?;
        self.log.info(format!("upload record {id} removed"));
        Ok(())
    }

    // ── Management queries ───────────────────────────────────────────

    /// Managed devices matching a device-name or user-principal search.
    pub async fn search_managed(&self, term: &str) -> Result<Vec<ManagementRecord>, CoreError> {
        let devices = self.list_managed().await?;
        Ok(devices
            .into_iter()
            .filter(|d| d.matches_search(term))
            .collect())
    }

    /// Managed devices that have not synced within `threshold_days`
    /// (or have never synced at all).
    pub async fn stale_managed(
        &self,
        threshold_days: i64,
    ) -> Result<Vec<ManagementRecord>, CoreError> {
        let now = Utc::now();
        let devices = self.list_managed().await?;
        Ok(devices
            .into_iter()
            .filter(|d| d.is_stale(now, threshold_days))
            .collect())
    }
}
