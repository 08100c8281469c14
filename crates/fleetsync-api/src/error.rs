use serde_json::Value;
use thiserror::Error;

/// Top-level error type for the `fleetsync-api` crate.
///
/// Remote failures keep the error payload verbatim -- `fleetsync-core`
/// classifies them into user-facing conditions and depends on the exact
/// payload shape, so nothing may be rewritten or swallowed here.
#[derive(Debug, Error)]
pub enum Error {
    /// Non-2xx response from the remote API. `payload` is the response
    /// body exactly as received (raw string wrapped in a JSON string
    /// when the body is not valid JSON).
    #[error("Remote API error (HTTP {status}): {}", summarize_payload(.payload))]
    Api { status: u16, payload: Value },

    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

/// Classification of a remote API failure.
///
/// The remote gives no structured taxonomy beyond the HTTP status, so
/// this is derived from status codes plus known error-code phrases and
/// message substrings observed in the wild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 404 -- the resource is already absent. Usually benign.
    NotFound,
    /// A previous deletion of this registration record is still
    /// settling remotely. A known condition, not a generic failure.
    DeletionInProgress,
    /// The target object is not yet queryable in the directory even
    /// though a cross-reference to it exists -- a propagation race.
    NotYetSynced,
    /// 401/403 -- the token lacks a required permission scope.
    PermissionDenied,
    /// 429 -- throttled by the remote.
    RateLimited,
    /// Anything else.
    Unknown,
}

/// Error-code phrase the registration system returns while a prior
/// deletion is still in flight. The misspelling is the remote's own.
const DELETION_IN_PROGRESS_PHRASE: &str = "ZtdDeviceDeletionInProgess";

impl Error {
    /// HTTP status of a remote API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if this error means the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// The remote error code, checked across the shapes the three
    /// backends use (`error.code` on graph-style payloads,
    /// `CustomApiErrorPhrase` on registration-system payloads).
    pub fn remote_code(&self) -> Option<&str> {
        let Self::Api { payload, .. } = self else {
            return None;
        };
        payload
            .pointer("/error/code")
            .or_else(|| payload.get("CustomApiErrorPhrase"))
            .and_then(Value::as_str)
    }

    /// The remote error message, checked across known payload shapes.
    pub fn remote_message(&self) -> Option<&str> {
        let Self::Api { payload, .. } = self else {
            return None;
        };
        payload
            .pointer("/error/message")
            .or_else(|| payload.get("Message"))
            .and_then(Value::as_str)
    }

    /// Classify this error into a user-facing condition.
    pub fn classify(&self) -> ApiErrorKind {
        if let Some(code) = self.remote_code() {
            if code == DELETION_IN_PROGRESS_PHRASE {
                return ApiErrorKind::DeletionInProgress;
            }
        }
        if let Some(msg) = self.remote_message() {
            if msg.contains("currently in progress") || msg.contains("less than 30minutes ago") {
                return ApiErrorKind::DeletionInProgress;
            }
            if msg.contains("does not exist") {
                return ApiErrorKind::NotYetSynced;
            }
        }
        match self.status() {
            Some(404) => ApiErrorKind::NotFound,
            Some(401 | 403) => ApiErrorKind::PermissionDenied,
            Some(429) => ApiErrorKind::RateLimited,
            _ => ApiErrorKind::Unknown,
        }
    }
}

/// Short display form of a remote payload for error messages.
/// The full payload stays attached to the variant.
fn summarize_payload(payload: &Value) -> String {
    payload
        .pointer("/error/message")
        .or_else(|| payload.get("Message"))
        .and_then(Value::as_str)
        .map_or_else(|| payload.to_string(), ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_deletion_in_progress_by_code() {
        let err = Error::Api {
            status: 400,
            payload: json!({ "CustomApiErrorPhrase": "ZtdDeviceDeletionInProgess" }),
        };
        assert_eq!(err.classify(), ApiErrorKind::DeletionInProgress);
    }

    #[test]
    fn classify_deletion_in_progress_by_message() {
        let err = Error::Api {
            status: 400,
            payload: json!({ "Message": "Device deletion is currently in progress - retry later" }),
        };
        assert_eq!(err.classify(), ApiErrorKind::DeletionInProgress);
    }

    #[test]
    fn classify_not_yet_synced() {
        let err = Error::Api {
            status: 404,
            payload: json!({ "error": {
                "code": "Request_ResourceNotFound",
                "message": "Resource 'abc' does not exist or one of its queried reference-property objects are not present."
            }}),
        };
        assert_eq!(err.classify(), ApiErrorKind::NotYetSynced);
    }

    #[test]
    fn classify_by_status() {
        let not_found = Error::Api {
            status: 404,
            payload: json!({}),
        };
        assert_eq!(not_found.classify(), ApiErrorKind::NotFound);
        assert!(not_found.is_not_found());

        let denied = Error::Api {
            status: 403,
            payload: json!({ "error": { "code": "Authorization_RequestDenied" } }),
        };
        assert_eq!(denied.classify(), ApiErrorKind::PermissionDenied);

        let throttled = Error::Api {
            status: 429,
            payload: json!({}),
        };
        assert_eq!(throttled.classify(), ApiErrorKind::RateLimited);
    }

    #[test]
    fn payload_preserved_verbatim() {
        let payload = json!({ "error": { "code": "X", "message": "Y", "innerError": { "request-id": "r1" } } });
        let err = Error::Api {
            status: 500,
            payload: payload.clone(),
        };
        let Error::Api { payload: kept, .. } = err else {
            unreachable!()
        };
        assert_eq!(kept, payload);
    }
}
