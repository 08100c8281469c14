// ── Deletion workflow (single registration record) ──
//
// Idle → Deleting → AwaitingRemoval → Done.
//
// The delete call only *initiates* removal; the record disappears from
// listings asynchronously, sometimes half an hour later. Once the call
// itself succeeds the caller is only ever told confirmed or
// unconfirmed -- never "failed".

use serde::Serialize;
use tracing::debug;

use fleetsync_api::ApiErrorKind;

use crate::auth::{TokenSource, scopes};
use crate::error::CoreError;
use crate::poll::{self, PollOutcome};

use super::Engine;

/// Terminal state of a deletion workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeletionOutcome {
    /// The record disappeared from the listing within the ceiling.
    Confirmed { attempts: u32 },
    /// Deletion was accepted but the record was still listed when the
    /// ceiling ran out. The remote may still be converging; refresh
    /// and re-check rather than retrying the delete.
    Unconfirmed { attempts: u32 },
    /// The remote reported a prior deletion still settling. No polling
    /// was performed.
    InProgress,
    /// The record was already gone (benign).
    AlreadyAbsent,
    /// Another deletion for this id is mid-flight in this session.
    AlreadyDeleting,
}

impl<S: TokenSource> Engine<S> {
    /// Delete a registration record and poll for its disappearance.
    pub async fn delete_registration(&self, id: &str) -> Result<DeletionOutcome, CoreError> {
        if self
            .deletions_in_flight
            .insert(id.to_owned(), ())
            .is_some()
        {
            self.log
                .warn(format!("deletion of {id} already in flight in this session"));
            return Ok(DeletionOutcome::AlreadyDeleting);
        }

        let result = self.delete_registration_inner(id).await;
        self.deletions_in_flight.remove(id);
        result
    }

    async fn delete_registration_inner(&self, id: &str) -> Result<DeletionOutcome, CoreError> {
        let token = self.token(&[scopes::SERVICE_CONFIG]).await?;

        self.log.info(format!("deleting registration record {id}"));
        if let Err(e) = self.autopilot.delete(&token, id).await {
            match e.classify() {
                // A prior delete is still settling: distinct outcome,
                // skip polling entirely.
                ApiErrorKind::DeletionInProgress => {
                    self.log.warn(format!(
                        "deletion of {id} already in progress remotely; wait and refresh"
                    ));
                    return Ok(DeletionOutcome::InProgress);
                }
                ApiErrorKind::NotFound => {
                    self.log.info(format!("{id} already absent"));
                    return Ok(DeletionOutcome::AlreadyAbsent);
                }
                _ => return Err(e.into()),
            }
        }

        // ── AwaitingRemoval ──────────────────────────────────────────
        let outcome = poll::run(self.polls.removal, self.sleeper.as_ref(), |attempt| {
            let fut = self.autopilot.list(&token);
            async move {
                let devices = fut.await?;
                let gone = !devices.iter().any(|d| d.id == id);
                debug!(attempt, gone, "removal check");
                Ok::<_, fleetsync_api::Error>(gone.then_some(()))
            }
        })
        .await;

        match outcome {
            PollOutcome::Confirmed { attempts, .. } => {
                self.log.success(format!("{id} removed after {attempts} checks"));
                Ok(DeletionOutcome::Confirmed { attempts })
            }
            PollOutcome::Unconfirmed { attempts } => {
                self.log.warn(format!(
                    "{id} still listed after {attempts} checks; removal completes remotely, \
                     refresh later to verify"
                ));
                // Best-effort refresh so a UI re-reading the listing
                // sees the freshest state; its outcome is deliberately
                // ignored for the terminal status.
                let _ = self.autopilot.list(&token).await;
                Ok(DeletionOutcome::Unconfirmed { attempts })
            }
        }
    }
}
