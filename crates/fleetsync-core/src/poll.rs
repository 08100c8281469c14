// ── Poll state machine ──
//
// The remote systems accept mutations without synchronous confirmation;
// the only way to observe an effect is to re-list and compare. Polling
// here is data ({interval, ceiling}) plus a check function, driven by a
// pluggable sleeper so any scheduler (or a test with no clock at all)
// can run the loop.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tracing::warn;

/// One polling loop's shape: how long to wait between checks, and how
/// many checks to issue before giving up.
#[derive(Debug, Clone, Copy)]
pub struct PollPlan {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPlan {
    pub const fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }
}

/// Terminal state of a polling loop.
///
/// `Unconfirmed` is not a failure: the remote may still converge after
/// the ceiling -- the caller simply stopped watching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Confirmed { value: T, attempts: u32 },
    Unconfirmed { attempts: u32 },
}

impl<T> PollOutcome<T> {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Confirmed { attempts, .. } | Self::Unconfirmed { attempts } => *attempts,
        }
    }
}

/// Suspension point used between poll attempts.
///
/// Production code uses [`TokioSleeper`]; tests use [`InstantSleeper`]
/// to drive ceilings without wall-clock time.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()>;
}

/// Sleeps on the tokio timer.
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Never actually waits. For tests.
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    fn sleep(&self, _duration: Duration) -> BoxFuture<'_, ()> {
        Box::pin(std::future::ready(()))
    }
}

/// Drive a poll loop to a terminal state.
///
/// Each attempt is wait-then-check. The check returns `Ok(Some(_))` to
/// terminate with confirmation, `Ok(None)` to keep polling, or `Err` --
/// which is logged and treated as "keep polling", because one failed
/// listing must never abort an otherwise healthy confirmation loop.
/// Issues at most `plan.max_attempts` checks and reports
/// [`PollOutcome::Unconfirmed`] after exactly that many.
pub async fn run<T, E, F, Fut>(
    plan: PollPlan,
    sleeper: &dyn Sleeper,
    mut check: F,
) -> PollOutcome<T>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    for attempt in 1..=plan.max_attempts {
        sleeper.sleep(plan.interval).await;

        match check(attempt).await {
            Ok(Some(value)) => return PollOutcome::Confirmed { value, attempts: attempt },
            Ok(None) => {}
            Err(e) => warn!(attempt, error = %e, "poll check failed, continuing"),
        }
    }

    PollOutcome::Unconfirmed {
        attempts: plan.max_attempts,
    }
}
