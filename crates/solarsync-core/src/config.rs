// ── Runtime run configuration ──
//
// These types describe *what* to poll and *how* to pace it. They carry
// credential data and tuning, but never touch disk: `solarsync-config`
// (or a test) constructs them and hands them in.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use solarsync_api::transport::{TlsMode, TransportConfig};

use crate::batch::BatchStrategy;

/// One vendor account: processed independently, once per run.
#[derive(Clone)]
pub struct CredentialSet {
    /// Human-readable identifier used in logs and summaries.
    pub host: String,
    /// Vendor API root, e.g. `https://neteco.example.com/openApi`.
    pub base_url: Url,
    pub username: String,
    pub password: SecretString,
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("host", &self.host)
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Bounded exponential backoff for logins refused under the
/// concurrent-session limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before retry `n` (0-based) is `backoff_base^n` seconds.
    pub backoff_base: u32,
    /// Total login attempts, including the first.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff_base: 2,
            max_attempts: 5,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        Duration::from_secs(u64::from(self.backoff_base.saturating_pow(attempt)))
    }
}

/// Session lifetime and login retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthPolicy {
    /// How long a token is trusted after issuance.
    pub token_validity: Duration,
    pub retry: RetryPolicy,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            token_validity: Duration::from_secs(30 * 60),
            retry: RetryPolicy::default(),
        }
    }
}

/// Batching and throttling of generation fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    pub strategy: BatchStrategy,
    /// Pause inserted between consecutive batches.
    pub pause: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            strategy: BatchStrategy::default(),
            pause: Duration::from_secs(10),
        }
    }
}

/// Where and what to report.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    /// `None` means dry run: log what would be posted, send nothing.
    pub ingest: Option<IngestTarget>,
    pub register_plants: bool,
    pub register_devices: bool,
    /// Values whose integer part has more digits than this are not posted.
    pub max_integer_digits: u32,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            ingest: None,
            register_plants: true,
            register_devices: false,
            max_integer_digits: 7,
        }
    }
}

/// Central ingestion API endpoint and credentials.
#[derive(Clone)]
pub struct IngestTarget {
    pub base_url: Url,
    pub api_token: SecretString,
}

impl fmt::Debug for IngestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestTarget")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (vendor gateways with self-signed certs).
    DangerAcceptInvalid,
}

/// HTTP client tuning shared by vendor and ingestion clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub tls: TlsVerification,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            tls: TlsVerification::default(),
            connect_timeout: Duration::from_secs(6),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl HttpSettings {
    /// Translate into the api crate's transport configuration.
    pub fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
        }
    }
}

/// Everything a [`RunController`](crate::RunController) needs besides
/// the credential sets themselves.
#[derive(Debug, Clone, Default)]
pub struct RunSettings {
    pub auth: AuthPolicy,
    pub fetch: FetchSettings,
    pub report: ReportSettings,
    pub http: HttpSettings,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn backoff_grows_exponentially() {
        let policy = RetryPolicy {
            backoff_base: 2,
            max_attempts: 5,
        };
        let delays: Vec<u64> = (0..4).map(|n| policy.delay(n).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8]);
    }

    #[test]
    fn backoff_saturates() {
        let policy = RetryPolicy {
            backoff_base: 10,
            max_attempts: 100,
        };
        assert_eq!(policy.delay(50).as_secs(), u64::from(u32::MAX));
    }

    #[test]
    fn debug_redacts_password() {
        let set = CredentialSet {
            host: "site-a".into(),
            base_url: Url::parse("https://vendor.example.com/openApi").unwrap(),
            username: "api-user".into(),
            password: SecretString::from("hunter2".to_string()),
        };
        let rendered = format!("{set:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("hunter2"));
    }
}
