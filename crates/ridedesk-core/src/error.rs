// ── Core error types ──
//
// User-facing errors from ridedesk-core. Consumers never see reqwest
// errors or JSON parse failures directly; `From<ridedesk_api::Error>`
// translates the transport taxonomy into these variants.
//
// `CoreError` is `Clone`: a single failed fetch is handed to every caller
// that joined the request and is also recorded on the cache entry.

use thiserror::Error;

use ridedesk_api::models::ValidationError;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Session expired -- sign in again")]
    SessionExpired,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if the server answered).
        status: Option<u16>,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Request cancelled")]
    Cancelled,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// HTTP status, when the failure came from a server response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::SessionExpired => Some(401),
            Self::PermissionDenied { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<ridedesk_api::Error> for CoreError {
    fn from(err: ridedesk_api::Error) -> Self {
        match err {
            ridedesk_api::Error::Unauthenticated => CoreError::SessionExpired,
            ridedesk_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            ridedesk_api::Error::Transport(ref e) => {
                let url = e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string);
                if e.is_timeout() {
                    CoreError::Timeout { url }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            ridedesk_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ridedesk_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ridedesk_api::Error::Api { status: 403, message } => {
                CoreError::PermissionDenied { message }
            }
            ridedesk_api::Error::Api { status: 404, message } => CoreError::NotFound { message },
            ridedesk_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            ridedesk_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Unexpected response: {message}"))
            }
        }
    }
}

impl From<ValidationError> for CoreError {
    fn from(err: ValidationError) -> Self {
        CoreError::ValidationFailed {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_http_statuses() {
        let not_found: CoreError = ridedesk_api::Error::Api {
            status: 404,
            message: "Driver not found".into(),
        }
        .into();
        assert_eq!(
            not_found,
            CoreError::NotFound {
                message: "Driver not found".into()
            }
        );

        let expired: CoreError = ridedesk_api::Error::Unauthenticated.into();
        assert!(expired.is_session_expired());
        assert_eq!(expired.status(), Some(401));

        let server: CoreError = ridedesk_api::Error::Api {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert_eq!(server.status(), Some(500));
    }

    #[test]
    fn validation_error_keeps_field() {
        let err: CoreError = ValidationError::new("plateNumber", "is required").into();
        assert_eq!(err.to_string(), "Validation failed: plateNumber: is required");
    }
}
