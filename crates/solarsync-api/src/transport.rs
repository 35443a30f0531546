// Shared transport configuration for building reqwest::Client instances.
//
// The vendor client and the ingestion client share TLS and timeout
// settings through this module, avoiding duplicated builder logic.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("solarsync/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (vendor portals with self-signed certs).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
///
/// `connect_timeout` bounds connection setup; `request_timeout` bounds
/// the whole request, so a hung vendor call surfaces as an ordinary
/// transport error instead of blocking the run.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            connect_timeout: Duration::from_secs(6),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .user_agent(USER_AGENT);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

/// Join an API path onto a base URL without dropping the base's own path.
///
/// `Url::join` replaces the last path segment unless the base ends in `/`,
/// which silently turns `https://host/openApi` + `login` into
/// `https://host/login`.
pub(crate) fn join_path(base: &url::Url, path: &str) -> Result<url::Url, Error> {
    let base = base.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Ok(url::Url::parse(&format!("{base}/{path}"))?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn join_keeps_base_path() {
        let base = url::Url::parse("https://vendor.example.com/openApi").unwrap();
        let url = join_path(&base, "login").unwrap();
        assert_eq!(url.as_str(), "https://vendor.example.com/openApi/login");
    }

    #[test]
    fn join_tolerates_slashes() {
        let base = url::Url::parse("http://127.0.0.1:8000/api/").unwrap();
        let url = join_path(&base, "/core/powerplants/").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/core/powerplants/");
    }

    #[test]
    fn default_client_builds() {
        TransportConfig::default().build_client().unwrap();
    }

    #[test]
    fn missing_ca_file_is_tls_error() {
        let config = TransportConfig {
            tls: TlsMode::CustomCa("/nonexistent/ca.pem".into()),
            ..TransportConfig::default()
        };
        assert!(matches!(config.build_client(), Err(Error::Tls(_))));
    }
}
