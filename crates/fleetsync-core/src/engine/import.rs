// ── Bulk import workflow ──
//
// Idle → Uploading → AwaitingRegistration
//      → [AwaitingDirectorySync → AssigningGroup] → Done.
//
// Every stage reports independently in the final summary; a later
// stage's failure never erases an earlier stage's success.

use std::sync::Mutex;
use std::time::Duration;

use futures_util::future::join_all;
use secrecy::SecretString;
use serde::Serialize;
use tracing::debug;

use fleetsync_api::ApiErrorKind;
use fleetsync_api::types::ImportDeviceRequest;

use crate::auth::{TokenSource, scopes};
use crate::csvio::ImportRow;
use crate::error::CoreError;
use crate::model::RegistrationRecord;
use crate::poll::{self, PollOutcome};

use super::Engine;

/// Retry budget for a group-membership addition racing directory
/// propagation. Backoff doubles from the base each retry.
const GROUP_ADD_RETRIES: u32 = 4;
const GROUP_ADD_BACKOFF_BASE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Directory group to add each imported device to, once its
    /// cross-reference id is populated.
    pub group_id: Option<String>,
}

/// Per-row upload outcome.
#[derive(Debug, Clone, Serialize)]
pub struct RowOutcome {
    pub serial_number: String,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-device group assignment outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AssignmentOutcome {
    Added,
    /// The device never gained a cross-reference id; addition was
    /// never attempted.
    NoCrossReference,
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupAssignment {
    pub serial_number: String,
    pub outcome: AssignmentOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub group_id: String,
    /// Whether every matched device showed a cross-reference id before
    /// the directory-sync ceiling.
    pub sync_confirmed: bool,
    pub sync_attempts: u32,
    pub assignments: Vec<GroupAssignment>,
}

impl GroupReport {
    pub fn added(&self) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.outcome == AssignmentOutcome::Added)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.assignments.len() - self.added()
    }
}

/// Terminal summary of a bulk import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub total: usize,
    pub uploaded: usize,
    pub failed: usize,
    pub rows: Vec<RowOutcome>,
    /// Whether every accepted serial became visible in the
    /// registration listing before the ceiling. `false` does not mean
    /// the import failed -- only that it was not yet observable.
    pub registration_confirmed: bool,
    pub registration_attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupReport>,
}

impl<S: TokenSource> Engine<S> {
    /// Run the bulk import workflow to a terminal summary.
    pub async fn run_import(
        &self,
        rows: Vec<ImportRow>,
        options: ImportOptions,
    ) -> Result<ImportSummary, CoreError> {
        let total = rows.len();
        self.log.info(format!("uploading {total} device identities"));

        // ── Uploading ────────────────────────────────────────────────
        let token = self.token(&[scopes::SERVICE_CONFIG]).await?;
        let requests: Vec<ImportDeviceRequest> = rows
            .iter()
            .map(|r| {
                ImportDeviceRequest::new(
                    r.serial_number.clone(),
                    r.hardware_identifier.clone(),
                    r.group_tag.clone(),
                )
            })
            .collect();
        let outcomes = self.autopilot.import(&token, &requests).await;

        let mut row_outcomes = Vec::with_capacity(total);
        let mut accepted: Vec<String> = Vec::new();
        for (row, outcome) in rows.iter().zip(outcomes) {
            match outcome {
                Ok(_) => {
                    accepted.push(row.serial_number.clone());
                    row_outcomes.push(RowOutcome {
                        serial_number: row.serial_number.clone(),
                        accepted: true,
                        error: None,
                    });
                }
                Err(e) => {
                    self.log
                        .error(format!("upload rejected for {}", row.serial_number), &e);
                    row_outcomes.push(RowOutcome {
                        serial_number: row.serial_number.clone(),
                        accepted: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let uploaded = accepted.len();
        let failed = total - uploaded;
        if uploaded == 0 {
            self.log.warn("no rows accepted; skipping registration polling");
            return Ok(ImportSummary {
                total,
                uploaded,
                failed,
                rows: row_outcomes,
                registration_confirmed: false,
                registration_attempts: 0,
                group: None,
            });
        }

        // ── AwaitingRegistration ─────────────────────────────────────
        self.log.info(format!(
            "waiting for {uploaded} uploaded devices to appear in the registration listing"
        ));
        let outcome = poll::run(self.polls.registration, self.sleeper.as_ref(), |attempt| {
            let fut = self.autopilot.list(&token);
            let accepted = &accepted;
            async move {
                let devices = fut.await?;
                let matched: Vec<RegistrationRecord> = devices
                    .into_iter()
                    .map(RegistrationRecord::from)
                    .filter(|d| accepted.contains(&d.serial_number))
                    .collect();
                debug!(attempt, matched = matched.len(), needed = uploaded, "registration check");
                Ok::<_, fleetsync_api::Error>((matched.len() >= uploaded).then_some(matched))
            }
        })
        .await;

        let (registration_confirmed, registration_attempts, matched) = match outcome {
            PollOutcome::Confirmed { value, attempts } => {
                self.log.success("all uploaded devices registered");
                (true, attempts, value)
            }
            PollOutcome::Unconfirmed { attempts } => {
                self.log.warn(
                    "devices uploaded but not yet visible in the registration listing; \
                     they typically appear within a few minutes",
                );
                (false, attempts, Vec::new())
            }
        };

        // ── [AwaitingDirectorySync → AssigningGroup] ─────────────────
        let group = match options.group_id {
            Some(group_id) if registration_confirmed => {
                Some(self.assign_group(&accepted, matched, &group_id).await?)
            }
            Some(group_id) => {
                self.log.warn(format!(
                    "skipping group assignment to {group_id}: registration unconfirmed"
                ));
                None
            }
            None => None,
        };

        Ok(ImportSummary {
            total,
            uploaded,
            failed,
            rows: row_outcomes,
            registration_confirmed,
            registration_attempts,
            group,
        })
    }

    /// Directory-sync wait plus group membership additions.
    async fn assign_group(
        &self,
        serials: &[String],
        observed_so_far: Vec<RegistrationRecord>,
        group_id: &str,
    ) -> Result<GroupReport, CoreError> {
        self.log.info(format!(
            "waiting for directory sync before assigning {} devices to group {group_id}",
            serials.len()
        ));

        // Directory sync shows up on the registration records, so this
        // stage still only needs the registration scope.
        let token = self.token(&[scopes::SERVICE_CONFIG]).await?;
        let observed = Mutex::new(observed_so_far);
        let outcome = poll::run(self.polls.directory_sync, self.sleeper.as_ref(), |attempt| {
            let fut = self.autopilot.list(&token);
            let observed = &observed;
            async move {
                let devices = fut.await?;
                let matched: Vec<RegistrationRecord> = devices
                    .into_iter()
                    .map(RegistrationRecord::from)
                    .filter(|d| serials.contains(&d.serial_number))
                    .collect();
                let synced = matched
                    .iter()
                    .filter(|d| d.directory_device_id.is_some())
                    .count();
                debug!(attempt, synced, total = serials.len(), "directory sync check");

                let all_synced = synced == serials.len() && matched.len() == serials.len();
                *observed
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner) = matched.clone();
                Ok::<_, fleetsync_api::Error>(all_synced.then_some(matched))
            }
        })
        .await;

        let (sync_confirmed, sync_attempts, devices) = match outcome {
            PollOutcome::Confirmed { value, attempts } => (true, attempts, value),
            PollOutcome::Unconfirmed { attempts } => (
                false,
                attempts,
                observed
                    .into_inner()
                    .unwrap_or_else(std::sync::PoisonError::into_inner),
            ),
        };

        // Group scopes are only requested now that an addition will
        // actually be attempted.
        let token = self
            .token(&[scopes::GROUPS_READ, scopes::GROUP_MEMBERS])
            .await?;

        // Best-effort group lookup for a readable log line; assignment
        // proceeds either way and surfaces its own errors per device.
        match self.directory.get_group(&token, group_id).await {
            Ok(group) => self.log.info(format!(
                "assigning to group {}",
                group.display_name.as_deref().unwrap_or(group_id)
            )),
            Err(e) => self.log.error(format!("group {group_id} lookup failed"), &e),
        }

        let futs = serials.iter().map(|serial| {
            let cross_reference = devices
                .iter()
                .find(|d| &d.serial_number == serial)
                .and_then(|d| d.directory_device_id.clone());
            let token = &token;
            async move {
                let outcome = match cross_reference {
                    // Never synced: no call, distinct failure.
                    None => AssignmentOutcome::NoCrossReference,
                    Some(object_id) => {
                        self.add_member_with_retry(token, group_id, &object_id).await
                    }
                };
                GroupAssignment {
                    serial_number: serial.clone(),
                    outcome,
                }
            }
        });
        let assignments = join_all(futs).await;

        let report = GroupReport {
            group_id: group_id.to_owned(),
            sync_confirmed,
            sync_attempts,
            assignments,
        };
        self.log.info(format!(
            "group assignment finished: {} added, {} failed",
            report.added(),
            report.failed()
        ));
        Ok(report)
    }

    /// Add one device to the group, retrying with exponential backoff
    /// while the directory object is not yet queryable.
    async fn add_member_with_retry(
        &self,
        token: &SecretString,
        group_id: &str,
        object_id: &str,
    ) -> AssignmentOutcome {
        let mut attempt = 0_u32;
        let mut delay = GROUP_ADD_BACKOFF_BASE;

        loop {
            match self
                .directory
                .add_group_member(token, group_id, object_id)
                .await
            {
                Ok(()) => return AssignmentOutcome::Added,
                Err(e) => {
                    let racing = matches!(
                        e.classify(),
                        ApiErrorKind::NotYetSynced | ApiErrorKind::NotFound
                    );
                    if !racing || attempt >= GROUP_ADD_RETRIES {
                        self.log
                            .error(format!("group add failed for {object_id}"), &e);
                        return AssignmentOutcome::Failed {
                            message: e.to_string(),
                        };
                    }
                    attempt += 1;
                    debug!(attempt, object_id, "directory object not queryable yet, backing off");
                    self.sleeper.sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
}
