// ── Offboarding workflow ──
//
// The most constrained sequence: management deletion, then
// registration deletion, then directory deletion -- never reordered.
// Deleting a registration while the device is still enrolled can leave
// the remote systems inconsistent, and deleting the directory object
// first loses the correlation id the other lookups need.

use std::time::Duration;

use serde::Serialize;

use crate::auth::{TokenSource, scopes};
use crate::error::CoreError;
use crate::model::{DirectoryRecord, ManagementRecord, RegistrationRecord};

use super::Engine;

/// Best-effort propagation wait between steps. Not a confirmation.
const SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Where a device was found during the pre-flight check.
///
/// Authoritative for which steps are *attempted*; it is not
/// re-validated before each step.
#[derive(Debug, Clone)]
pub struct DevicePresence {
    pub management: Option<ManagementRecord>,
    pub registration: Option<RegistrationRecord>,
    pub directory: Option<DirectoryRecord>,
}

impl DevicePresence {
    pub fn any(&self) -> bool {
        self.management.is_some() || self.registration.is_some() || self.directory.is_some()
    }
}

/// Outcome of one offboarding step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Pre-flight found the device absent here (or an earlier hard
    /// stop prevented the attempt).
    Skipped,
    Deleted,
    /// The delete hit a 404 -- someone else got there first. Benign.
    AlreadyAbsent,
    Failed { message: String },
}

impl StepOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Per-step offboarding report. Earlier successes are never rolled
/// back or erased by later failures.
#[derive(Debug, Clone, Serialize)]
pub struct OffboardReport {
    pub management: StepOutcome,
    pub registration: StepOutcome,
    pub directory: StepOutcome,
    /// True when the management step failed and the remaining steps
    /// were never attempted.
    pub aborted: bool,
}

impl<S: TokenSource> Engine<S> {
    /// Pre-flight existence check across all three systems.
    ///
    /// Correlation is by serial number (management → registration) and
    /// by cross-reference id (management → directory) -- never by
    /// remote-assigned id, since each system mints its own. Lookup
    /// failures in the registration and directory systems degrade to
    /// "absent" (logged), matching how the check is used: a system we
    /// cannot see is a system we must not delete from.
    pub async fn check_presence(&self, managed_id: &str) -> Result<DevicePresence, CoreError> {
        let token = self
            .token(&[
                scopes::MANAGED_DEVICES,
                scopes::SERVICE_CONFIG,
                scopes::DIRECTORY_DEVICES,
            ])
            .await?;

        let management: Option<ManagementRecord> = match self.intune.get(&token, managed_id).await
        {
            Ok(raw) => Some(raw.into()),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e.into()),
        };

        let registration = match management.as_ref().and_then(|m| m.serial_number.as_deref()) {
            Some(serial) => match self.autopilot.list(&token).await {
                Ok(devices) => devices
                    .into_iter()
                    .map(RegistrationRecord::from)
                    .find(|d| d.serial_number == serial),
                Err(e) => {
                    self.log
                        .error("registration lookup failed during pre-flight", &e);
                    None
                }
            },
            None => None,
        };

        let directory = match management
            .as_ref()
            .and_then(|m| m.directory_device_id.as_deref())
        {
            Some(cross_reference) => match self.directory.list_devices(&token).await {
                Ok(devices) => devices
                    .into_iter()
                    .map(DirectoryRecord::from)
                    .find(|d| d.device_id.as_deref() == Some(cross_reference)),
                Err(e) => {
                    self.log
                        .error("directory lookup failed during pre-flight", &e);
                    None
                }
            },
            None => None,
        };

        Ok(DevicePresence {
            management,
            registration,
            directory,
        })
    }

    /// Run the offboarding sequence for a device the pre-flight check
    /// located. No rollback: a failure in a later step leaves earlier
    /// deletions in place, reported per step.
    pub async fn offboard(&self, presence: &DevicePresence) -> Result<OffboardReport, CoreError> {
        let token = self
            .token(&[
                scopes::MANAGED_DEVICES,
                scopes::SERVICE_CONFIG,
                scopes::DIRECTORY_DEVICES,
            ])
            .await?;

        let mut report = OffboardReport {
            management: StepOutcome::Skipped,
            registration: StepOutcome::Skipped,
            directory: StepOutcome::Skipped,
            aborted: false,
        };

        // ── Step 1: management system ────────────────────────────────
        if let Some(managed) = &presence.management {
            match self.intune.delete(&token, &managed.id).await {
                Ok(()) => {
                    self.log.success(format!("management record {} deleted", managed.id));
                    report.management = StepOutcome::Deleted;
                }
                Err(e) if e.is_not_found() => {
                    self.log.info(format!("management record {} already absent", managed.id));
                    report.management = StepOutcome::AlreadyAbsent;
                }
                Err(e) => {
                    // Hard stop: continuing would delete the
                    // registration of a still-enrolled device.
                    self.log.error("management deletion failed, aborting", &e);
                    report.management = StepOutcome::Failed {
                        message: e.to_string(),
                    };
                    report.aborted = true;
                    return Ok(report);
                }
            }
        }

        self.sleeper.sleep(SETTLE_DELAY).await;

        // ── Step 2: registration system ──────────────────────────────
        if let Some(registration) = &presence.registration {
            report.registration = match self.autopilot.delete(&token, &registration.id).await {
                Ok(()) => StepOutcome::Deleted,
                Err(e) if e.is_not_found() => StepOutcome::AlreadyAbsent,
                Err(e) => {
                    self.log.error("registration deletion failed", &e);
                    StepOutcome::Failed {
                        message: e.to_string(),
                    }
                }
            };
        }

        self.sleeper.sleep(SETTLE_DELAY).await;

        // ── Step 3: directory system ─────────────────────────────────
        if let Some(directory) = &presence.directory {
            report.directory = match self
                .directory
                .delete_device(&token, &directory.object_id)
                .await
            {
                Ok(()) => StepOutcome::Deleted,
                Err(e) if e.is_not_found() => StepOutcome::AlreadyAbsent,
                Err(e) => {
                    self.log.error("directory deletion failed", &e);
                    StepOutcome::Failed {
                        message: e.to_string(),
                    }
                }
            };
        }

        Ok(report)
    }
}
