//! Configuration for solarsync.
//!
//! TOML file + environment, an optional legacy JSON credentials file,
//! secret resolution (env var or plaintext), validation, and translation
//! into `solarsync_core` runtime types.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use solarsync_core::{
    AuthPolicy, BatchStrategy, CredentialSet, FetchSettings, HttpSettings, IngestTarget,
    ReportSettings, RetryPolicy, RunSettings, TlsVerification,
};

/// Environment variable prefix; `__` separates nested keys
/// (`SOLARSYNC_INGEST__API_TOKEN`).
pub const ENV_PREFIX: &str = "SOLARSYNC_";

const REDACTED: &str = "[REDACTED]";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("credentials file not found: {}", path.display())]
    CredentialsFileNotFound { path: PathBuf },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credential sets configured")]
    NoCredentials,

    #[error("no credential set for host '{host}'")]
    UnknownHost { host: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Legacy `{"credentials": [...]}` JSON file, relative to the config
    /// file. Its sets are appended to `credentials`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_file: Option<PathBuf>,

    #[serde(default)]
    pub ingest: IngestSection,

    #[serde(default)]
    pub fetch: FetchSection,

    #[serde(default)]
    pub auth: AuthSection,

    #[serde(default)]
    pub http: HttpSection,

    /// Vendor accounts, processed in order.
    #[serde(default)]
    pub credentials: Vec<CredentialEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IngestSection {
    /// Ingestion API root, e.g. `http://127.0.0.1:8000/api`.
    pub base_url: Option<String>,

    /// API token (plaintext -- prefer `api_token_env`).
    pub api_token: Option<String>,

    /// Environment variable holding the API token.
    pub api_token_env: Option<String>,

    pub register_plants: bool,
    pub register_devices: bool,
    pub max_integer_digits: u32,
}

impl Default for IngestSection {
    fn default() -> Self {
        let report = ReportSettings::default();
        Self {
            base_url: None,
            api_token: None,
            api_token_env: None,
            register_plants: report.register_plants,
            register_devices: report.register_devices,
            max_integer_digits: report.max_integer_digits,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchSection {
    /// Split plants into this many batches (default 4).
    pub batch_partitions: Option<usize>,
    /// Or: fixed batch size. Mutually exclusive with `batch_partitions`.
    pub batch_size: Option<usize>,
    pub batch_pause_secs: u64,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            batch_partitions: None,
            batch_size: None,
            batch_pause_secs: FetchSettings::default().pause.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthSection {
    pub token_validity_secs: u64,
    pub backoff_base: u32,
    pub max_login_attempts: u32,
}

impl Default for AuthSection {
    fn default() -> Self {
        let policy = AuthPolicy::default();
        Self {
            token_validity_secs: policy.token_validity.as_secs(),
            backoff_base: policy.retry.backoff_base,
            max_login_attempts: policy.retry.max_attempts,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpSection {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Accept invalid TLS certificates.
    pub insecure: bool,
    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,
}

impl Default for HttpSection {
    fn default() -> Self {
        let http = HttpSettings::default();
        Self {
            connect_timeout_secs: http.connect_timeout.as_secs(),
            request_timeout_secs: http.request_timeout.as_secs(),
            insecure: false,
            ca_cert: None,
        }
    }
}

/// One vendor account. Field names match the legacy JSON file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CredentialEntry {
    #[serde(default)]
    pub host: String,

    /// Vendor API root, e.g. `https://neteco.example.com/openApi`.
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub user: String,

    /// Password (plaintext -- prefer `password_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable holding the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyCredentials {
    #[serde(default)]
    credentials: Vec<CredentialEntry>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "solarsync", "solarsync").map_or_else(
        || PathBuf::from("solarsync.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load configuration: defaults ← TOML file ← `SOLARSYNC_*` env vars,
/// then append sets from `credentials_file` if one is named.
///
/// `explicit` overrides the default path and must exist. The default
/// path may be absent; env vars alone can then supply everything.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match explicit {
        Some(path) if !path.exists() => {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Some(path) => path.to_path_buf(),
        None => config_path(),
    };

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let mut config: Config = figment.extract()?;

    if let Some(file) = config.credentials_file.take() {
        let file = if file.is_relative() {
            path.parent().map_or_else(|| file.clone(), |dir| dir.join(&file))
        } else {
            file
        };
        let legacy = load_legacy_credentials(&file)?;
        config.credentials.extend(legacy);
        config.credentials_file = Some(file);
    }

    Ok(config)
}

/// Read a legacy `{"credentials": [{host, base_url, user, password}]}` file.
pub fn load_legacy_credentials(path: &Path) -> Result<Vec<CredentialEntry>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::CredentialsFileNotFound {
            path: path.to_path_buf(),
        });
    }
    let legacy: LegacyCredentials = Figment::from(Json::file(path)).extract()?;
    Ok(legacy.credentials)
}

// ── Secret resolution ───────────────────────────────────────────────

/// Env var (if named and set) wins over plaintext.
fn resolve_secret(inline: Option<&str>, env_name: Option<&str>) -> Option<SecretString> {
    env_name
        .and_then(|name| std::env::var(name).ok())
        .filter(|value| !value.is_empty())
        .or_else(|| inline.filter(|v| !v.is_empty()).map(str::to_owned))
        .map(SecretString::from)
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| invalid(field, format!("'{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(field, format!("'{raw}': expected http or https")));
    }
    Ok(url)
}

// ── Translation into runtime types ──────────────────────────────────

impl CredentialEntry {
    /// Validate and convert. `index` is used in error messages.
    pub fn resolve(&self, index: usize) -> Result<CredentialSet, ConfigError> {
        let field = |name: &str| format!("credentials[{index}].{name}");

        let host = self.host.trim();
        if host.is_empty() {
            return Err(invalid(field("host"), "must not be empty"));
        }
        let base_url = parse_url(&field("base_url"), self.base_url.trim())?;
        if self.user.trim().is_empty() {
            return Err(invalid(field("user"), "must not be empty"));
        }
        let password = resolve_secret(self.password.as_deref(), self.password_env.as_deref())
            .ok_or_else(|| {
                invalid(
                    field("password"),
                    match &self.password_env {
                        Some(name) => format!("environment variable {name} is not set"),
                        None => "missing (set password or password_env)".into(),
                    },
                )
            })?;

        Ok(CredentialSet {
            host: host.to_owned(),
            base_url,
            username: self.user.trim().to_owned(),
            password,
        })
    }
}

impl Config {
    /// All credential sets, validated. Host names must be unique.
    pub fn credential_sets(&self) -> Result<Vec<CredentialSet>, ConfigError> {
        if self.credentials.is_empty() {
            return Err(ConfigError::NoCredentials);
        }

        let mut seen = HashSet::new();
        self.credentials
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let set = entry.resolve(index)?;
                if !seen.insert(set.host.clone()) {
                    return Err(invalid(
                        format!("credentials[{index}].host"),
                        format!("duplicate host '{}'", set.host),
                    ));
                }
                Ok(set)
            })
            .collect()
    }

    /// Build run settings. With `dry_run` the ingestion target is
    /// ignored; otherwise it is required.
    pub fn run_settings(&self, dry_run: bool) -> Result<RunSettings, ConfigError> {
        Ok(RunSettings {
            auth: self.auth_policy()?,
            fetch: self.fetch_settings()?,
            report: self.report_settings(dry_run)?,
            http: self.http_settings(),
        })
    }

    fn auth_policy(&self) -> Result<AuthPolicy, ConfigError> {
        let auth = &self.auth;
        if auth.max_login_attempts < 1 {
            return Err(invalid("auth.max_login_attempts", "must be at least 1"));
        }
        if auth.backoff_base < 2 {
            return Err(invalid("auth.backoff_base", "must be at least 2"));
        }
        if auth.token_validity_secs == 0 {
            return Err(invalid("auth.token_validity_secs", "must be positive"));
        }
        Ok(AuthPolicy {
            token_validity: Duration::from_secs(auth.token_validity_secs),
            retry: RetryPolicy {
                backoff_base: auth.backoff_base,
                max_attempts: auth.max_login_attempts,
            },
        })
    }

    fn fetch_settings(&self) -> Result<FetchSettings, ConfigError> {
        let strategy = match (self.fetch.batch_partitions, self.fetch.batch_size) {
            (Some(_), Some(_)) => {
                return Err(invalid(
                    "fetch",
                    "set either batch_partitions or batch_size, not both",
                ));
            }
            (Some(0), None) => return Err(invalid("fetch.batch_partitions", "must be at least 1")),
            (None, Some(0)) => return Err(invalid("fetch.batch_size", "must be at least 1")),
            (Some(partitions), None) => BatchStrategy::Partitions(partitions),
            (None, Some(size)) => BatchStrategy::Size(size),
            (None, None) => BatchStrategy::default(),
        };
        Ok(FetchSettings {
            strategy,
            pause: Duration::from_secs(self.fetch.batch_pause_secs),
        })
    }

    fn report_settings(&self, dry_run: bool) -> Result<ReportSettings, ConfigError> {
        let ingest = &self.ingest;
        if ingest.max_integer_digits < 1 {
            return Err(invalid("ingest.max_integer_digits", "must be at least 1"));
        }

        let target = if dry_run {
            None
        } else {
            let raw = ingest
                .base_url
                .as_deref()
                .ok_or_else(|| invalid("ingest.base_url", "missing (or pass --dry-run)"))?;
            let base_url = parse_url("ingest.base_url", raw.trim())?;
            let api_token =
                resolve_secret(ingest.api_token.as_deref(), ingest.api_token_env.as_deref())
                    .ok_or_else(|| {
                        invalid("ingest.api_token", "missing (set api_token or api_token_env)")
                    })?;
            Some(IngestTarget {
                base_url,
                api_token,
            })
        };

        Ok(ReportSettings {
            ingest: target,
            register_plants: ingest.register_plants,
            register_devices: ingest.register_devices,
            max_integer_digits: ingest.max_integer_digits,
        })
    }

    fn http_settings(&self) -> HttpSettings {
        let tls = if self.http.insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca) = self.http.ca_cert {
            TlsVerification::CustomCa(ca.clone())
        } else {
            TlsVerification::SystemDefaults
        };
        HttpSettings {
            tls,
            connect_timeout: Duration::from_secs(self.http.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.http.request_timeout_secs),
        }
    }

    /// Copy with every secret replaced.
    pub fn redacted(&self) -> Config {
        let mut copy = self.clone();
        if copy.ingest.api_token.is_some() {
            copy.ingest.api_token = Some(REDACTED.into());
        }
        for entry in &mut copy.credentials {
            if entry.password.is_some() {
                entry.password = Some(REDACTED.into());
            }
        }
        copy
    }

    /// Redacted TOML rendering.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&self.redacted())?)
    }
}

/// Keep only the sets named in `hosts`, in configured order. An empty
/// filter keeps everything.
pub fn select_hosts(
    sets: Vec<CredentialSet>,
    hosts: &[String],
) -> Result<Vec<CredentialSet>, ConfigError> {
    if hosts.is_empty() {
        return Ok(sets);
    }
    if let Some(missing) = hosts.iter().find(|h| !sets.iter().any(|s| &s.host == *h)) {
        return Err(ConfigError::UnknownHost {
            host: missing.clone(),
        });
    }
    Ok(sets
        .into_iter()
        .filter(|s| hosts.contains(&s.host))
        .collect())
}
