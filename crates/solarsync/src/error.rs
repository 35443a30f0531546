//! CLI error types with miette diagnostics.
//!
//! Configuration problems are caught before any run starts and get
//! their own exit codes; failures inside a run are reported in the
//! summary and never change the exit code.

use miette::Diagnostic;
use thiserror::Error;

use solarsync_config::ConfigError;
use solarsync_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const NO_CREDENTIALS: i32 = 5;
    pub const CONFIG: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(solarsync::no_config),
        help("Create it, point --config / SOLARSYNC_CONFIG at one, or run: solarsync config path")
    )]
    NoConfig { path: String },

    #[error("No credential sets configured")]
    #[diagnostic(
        code(solarsync::no_credentials),
        help("Add at least one [[credentials]] table or set credentials_file.")
    )]
    NoCredentials,

    #[error("No credential set named '{host}'")]
    #[diagnostic(code(solarsync::unknown_host), help("Check the host names in your config."))]
    UnknownHost { host: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(solarsync::validation))]
    Validation { field: String, reason: String },

    #[error("{0}")]
    #[diagnostic(code(solarsync::config))]
    Config(String),

    // ── Vendor ───────────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(code(solarsync::auth_failed), help("Verify user and password for this host."))]
    AuthFailed { message: String },

    #[error("Could not reach {url}: {reason}")]
    #[diagnostic(code(solarsync::connection_failed))]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out: {url}")]
    #[diagnostic(code(solarsync::timeout))]
    Timeout { url: String },

    #[error("API error: {message}")]
    #[diagnostic(code(solarsync::api_error))]
    Api { message: String },

    #[error("{failed} of {total} credential sets failed")]
    #[diagnostic(code(solarsync::partial_failure))]
    SetsFailed { failed: usize, total: usize },

    // ── Serialization ────────────────────────────────────────────────
    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(solarsync::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoConfig { .. } | Self::UnknownHost { .. } => exit_code::NOT_FOUND,
            Self::NoCredentials => exit_code::NO_CREDENTIALS,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Config(_) => exit_code::CONFIG,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Api { .. } | Self::SetsFailed { .. } | Self::Json(_) => {
                exit_code::GENERAL
            }
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } | ConfigError::CredentialsFileNotFound { path } => {
                CliError::NoConfig {
                    path: path.display().to_string(),
                }
            }
            ConfigError::NoCredentials => CliError::NoCredentials,
            ConfigError::UnknownHost { host } => CliError::UnknownHost { host },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other @ (ConfigError::Serialization(_) | ConfigError::Figment(_)) => {
                CliError::Config(other.to_string())
            }
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::LoginRetriesExhausted { attempts } => CliError::AuthFailed {
                message: format!("concurrent session limit after {attempts} attempts"),
            },
            CoreError::SessionExpired => CliError::AuthFailed {
                message: "session expired".into(),
            },
            CoreError::Transport { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout { url } => CliError::Timeout { url },
            CoreError::Api { message, .. } => CliError::Api { message },
            CoreError::Config { message } => CliError::Config(message),
        }
    }
}
