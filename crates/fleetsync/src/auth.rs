//! Token acquisition for the CLI.
//!
//! "Silent" is an externally supplied token (`FLEETSYNC_ACCESS_TOKEN`);
//! the interactive fallback is a secure prompt on the terminal. The
//! engine drives the silent-then-interactive policy -- this type only
//! supplies the two flows.

use secrecy::SecretString;

use fleetsync_core::auth::{AuthError, TokenSource};

const TOKEN_ENV: &str = "FLEETSYNC_ACCESS_TOKEN";

pub struct CliTokenSource {
    credentials_configured: bool,
}

impl CliTokenSource {
    pub fn new(credentials_configured: bool) -> Self {
        Self {
            credentials_configured,
        }
    }
}

impl TokenSource for CliTokenSource {
    fn has_valid_credentials(&self) -> bool {
        self.credentials_configured || std::env::var(TOKEN_ENV).is_ok()
    }

    async fn acquire_silent(&self, _scopes: &[&str]) -> Result<SecretString, AuthError> {
        match std::env::var(TOKEN_ENV) {
            Ok(token) if !token.is_empty() => Ok(SecretString::from(token)),
            _ => Err(AuthError::InteractionRequired {
                message: format!("{TOKEN_ENV} is not set"),
            }),
        }
    }

    async fn acquire_interactive(&self, scopes: &[&str]) -> Result<SecretString, AuthError> {
        eprintln!("A bearer token is required for scopes:");
        for scope in scopes {
            eprintln!("  - {scope}");
        }
        let token = rpassword::prompt_password("Access token: ").map_err(|e| {
            AuthError::Failed {
                message: format!("token prompt failed: {e}"),
            }
        })?;
        if token.is_empty() {
            return Err(AuthError::Failed {
                message: "empty token".into(),
            });
        }
        Ok(SecretString::from(token))
    }
}
