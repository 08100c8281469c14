// ── Token acquisition port ──
//
// The engine never talks to an identity provider directly. It consumes
// a `TokenSource` and requests a fresh token per workflow stage, since
// each stage may need a different permission scope set.

use std::future::Future;

use secrecy::SecretString;
use thiserror::Error;

/// Permission scopes, one constant per concern. Workflow stages request
/// exactly the scopes they need -- group scopes are only ever requested
/// when group assignment is enabled.
pub mod scopes {
    /// Read/write enrolled devices in the management system.
    pub const MANAGED_DEVICES: &str =
        "https://graph.microsoft.com/DeviceManagementManagedDevices.ReadWrite.All";
    /// Read/write registration-system service configuration
    /// (device identities, bulk import).
    pub const SERVICE_CONFIG: &str =
        "https://graph.microsoft.com/DeviceManagementServiceConfig.ReadWrite.All";
    /// Read/write directory device objects.
    pub const DIRECTORY_DEVICES: &str = "https://graph.microsoft.com/Device.ReadWrite.All";
    /// Read directory groups.
    pub const GROUPS_READ: &str = "https://graph.microsoft.com/Group.Read.All";
    /// Modify directory group membership.
    pub const GROUP_MEMBERS: &str = "https://graph.microsoft.com/GroupMember.ReadWrite.All";
}

/// Token acquisition failure.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The cached/silent flow cannot proceed without user interaction
    /// (consent, MFA, expired refresh). Callers fall back to an
    /// interactive flow on this variant and on nothing else.
    #[error("interaction required: {message}")]
    InteractionRequired { message: String },

    /// No credential pair is configured.
    #[error("credentials not configured")]
    NotConfigured,

    /// Any other acquisition failure. Propagated as-is.
    #[error("token acquisition failed: {message}")]
    Failed { message: String },
}

/// Source of bearer tokens for remote operations.
pub trait TokenSource: Send + Sync {
    /// Whether a credential pair is configured at all. Checked before
    /// any workflow starts; a `false` here means acquisition cannot
    /// possibly succeed.
    fn has_valid_credentials(&self) -> bool;

    /// Attempt cached/silent acquisition for the given scopes.
    fn acquire_silent(
        &self,
        scopes: &[&str],
    ) -> impl Future<Output = Result<SecretString, AuthError>> + Send;

    /// Interactive consent flow for the given scopes.
    fn acquire_interactive(
        &self,
        scopes: &[&str],
    ) -> impl Future<Output = Result<SecretString, AuthError>> + Send;
}

/// Silent-then-interactive acquisition.
///
/// Tries the silent flow first; falls back to the interactive flow
/// *only* when the silent flow reports
/// [`AuthError::InteractionRequired`]. Every other failure propagates
/// unchanged.
pub async fn acquire_with_fallback<S: TokenSource>(
    source: &S,
    scopes: &[&str],
) -> Result<SecretString, AuthError> {
    match source.acquire_silent(scopes).await {
        Ok(token) => Ok(token),
        Err(AuthError::InteractionRequired { message }) => {
            tracing::debug!(reason = %message, "silent acquisition failed, trying interactive");
            source.acquire_interactive(scopes).await
        }
        Err(e) => Err(e),
    }
}

/// A token source backed by one pre-acquired token.
///
/// Useful for automation where a token is supplied externally (CI, a
/// wrapping script) and for tests. Silent acquisition always succeeds;
/// the interactive flow is never reached.
pub struct StaticTokenSource {
    token: SecretString,
}

impl StaticTokenSource {
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }
}

impl TokenSource for StaticTokenSource {
    fn has_valid_credentials(&self) -> bool {
        true
    }

    async fn acquire_silent(&self, _scopes: &[&str]) -> Result<SecretString, AuthError> {
        Ok(self.token.clone())
    }

    async fn acquire_interactive(&self, _scopes: &[&str]) -> Result<SecretString, AuthError> {
        Err(AuthError::Failed {
            message: "static token source cannot run an interactive flow".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakySource {
        silent_calls: AtomicU32,
        interactive_calls: AtomicU32,
        silent_error: fn() -> AuthError,
    }

    impl TokenSource for FlakySource {
        fn has_valid_credentials(&self) -> bool {
            true
        }

        async fn acquire_silent(&self, _scopes: &[&str]) -> Result<SecretString, AuthError> {
            self.silent_calls.fetch_add(1, Ordering::SeqCst);
            Err((self.silent_error)())
        }

        async fn acquire_interactive(&self, _scopes: &[&str]) -> Result<SecretString, AuthError> {
            self.interactive_calls.fetch_add(1, Ordering::SeqCst);
            Ok(SecretString::from("interactive-token"))
        }
    }

    #[tokio::test]
    async fn falls_back_on_interaction_required() {
        let source = FlakySource {
            silent_calls: AtomicU32::new(0),
            interactive_calls: AtomicU32::new(0),
            silent_error: || AuthError::InteractionRequired {
                message: "consent needed".into(),
            },
        };

        let token = acquire_with_fallback(&source, &[scopes::SERVICE_CONFIG])
            .await
            .expect("fallback should succeed");
        drop(token);
        assert_eq!(source.silent_calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.interactive_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn other_failures_propagate_without_fallback() {
        let source = FlakySource {
            silent_calls: AtomicU32::new(0),
            interactive_calls: AtomicU32::new(0),
            silent_error: || AuthError::Failed {
                message: "network down".into(),
            },
        };

        let err = acquire_with_fallback(&source, &[scopes::SERVICE_CONFIG])
            .await
            .expect_err("should propagate");
        assert!(matches!(err, AuthError::Failed { .. }));
        assert_eq!(source.interactive_calls.load(Ordering::SeqCst), 0);
    }
}
