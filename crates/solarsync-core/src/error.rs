// ── Core error types ──
//
// Run-level errors. Consumers never see raw reqwest or serde errors:
// the `From<solarsync_api::Error>` impl translates transport-layer
// failures into the auth / API / transport buckets the run controller
// reasons about.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Login refused after {attempts} attempts: concurrent session limit")]
    LoginRetriesExhausted { attempts: u32 },

    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ────────────────────────────────────────────────────
    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Request timed out: {url}")]
    Timeout { url: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// Vendor `failCode`, if the failure came from an envelope.
        fail_code: Option<i64>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Whether this error should abort the current credential set
    /// rather than just the call that raised it.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::LoginRetriesExhausted { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<solarsync_api::Error> for CoreError {
    fn from(err: solarsync_api::Error) -> Self {
        use solarsync_api::Error as ApiError;

        match err {
            ApiError::Authentication { message } => CoreError::AuthenticationFailed { message },
            ApiError::ConcurrentSessionLimit { message } => CoreError::AuthenticationFailed {
                message: format!("concurrent session limit: {message}"),
            },
            ApiError::SessionExpired => CoreError::SessionExpired,
            ApiError::Transport(ref e) => {
                let url = e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string);
                if e.is_timeout() {
                    CoreError::Timeout { url }
                } else {
                    CoreError::Transport {
                        url,
                        reason: e.to_string(),
                    }
                }
            }
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ApiError::Tls(reason) => CoreError::Config {
                message: format!("TLS error: {reason}"),
            },
            ApiError::Http { status, message } => CoreError::Api {
                message: format!("HTTP {status}: {message}"),
                fail_code: None,
                status: Some(status),
            },
            ApiError::Vendor { fail_code, message } => CoreError::Api {
                message,
                fail_code,
                status: None,
            },
            ApiError::Ingest { status, message } => CoreError::Api {
                message: format!("ingestion rejected: {message}"),
                fail_code: None,
                status: Some(status),
            },
            ApiError::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("malformed response: {message}"),
                fail_code: None,
                status: None,
            },
        }
    }
}
