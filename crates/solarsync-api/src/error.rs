use thiserror::Error;

/// Top-level error type for the `solarsync-api` crate.
///
/// Covers every failure mode of the vendor monitoring API and the
/// central ingestion API: authentication, transport, vendor envelopes,
/// and response decoding. `solarsync-core` maps these into run-level
/// outcomes.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (wrong credentials, locked account, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The vendor refused the login because too many sessions are open
    /// for this account. Retrying later may succeed.
    #[error("Concurrent session limit reached: {message}")]
    ConcurrentSessionLimit { message: String },

    /// The token is no longer accepted by the vendor.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Vendor API ──────────────────────────────────────────────────
    /// Non-2xx HTTP status from a vendor endpoint.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Failure envelope (`{"success": false, "failCode": N}`) from the vendor.
    #[error("Vendor API error (failCode {}): {message}", .fail_code.map_or_else(|| "-".to_owned(), |c| c.to_string()))]
    Vendor {
        fail_code: Option<i64>,
        message: String,
    },

    // ── Ingestion API ───────────────────────────────────────────────
    /// Non-2xx response from the central ingestion API.
    #[error("Ingestion API rejected request (HTTP {status}): {message}")]
    Ingest { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates the session has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// Returns `true` for the vendor's "too many online sessions" refusal.
    pub fn is_concurrent_session_limit(&self) -> bool {
        matches!(self, Self::ConcurrentSessionLimit { .. })
    }

    /// Returns `true` if this is a transient error worth retrying later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::ConcurrentSessionLimit { .. } => true,
            _ => false,
        }
    }
}

/// Truncate a response body for inclusion in error messages.
pub(crate) fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
