// Central ingestion API client
//
// Three stateless JSON POSTs authenticated with a static
// `Authorization: Token <key>` header. The ingestion API's schema is
// owned elsewhere; these bodies mirror what it accepts today.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, preview};
use crate::transport::{TransportConfig, join_path};

const PLANTS_PATH: &str = "core/powerplants/";
const DEVICES_PATH: &str = "core/devices/";
const LOGGER_POWER_GEN_PATH: &str = "core/logger-power-gen/";

/// Body of `POST /core/powerplants/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantRegistration<'a> {
    pub plant_id: &'a str,
    pub plant_name: &'a str,
}

/// Body of `POST /core/devices/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceRegistration<'a> {
    pub plant_id: &'a str,
    pub plant_name: &'a str,
    pub logger_name: &'a str,
    pub device_id: &'a str,
    pub device_name: &'a str,
}

/// Body of `POST /core/logger-power-gen/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggerPowerGen<'a> {
    pub logger_name: &'a str,
    pub power_gen: f64,
}

/// HTTP client for the central ingestion API.
pub struct IngestClient {
    http: reqwest::Client,
    base_url: Url,
    api_token: SecretString,
}

impl IngestClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the API root, e.g. `http://127.0.0.1:8000/api`.
    pub fn new(
        base_url: Url,
        api_token: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, api_token))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, api_token: SecretString) -> Self {
        Self {
            http,
            base_url,
            api_token,
        }
    }

    /// Register (or re-register) a plant.
    pub async fn post_plant(&self, body: &PlantRegistration<'_>) -> Result<(), Error> {
        self.post(PLANTS_PATH, body).await
    }

    /// Register (or re-register) a device under its plant and logger.
    pub async fn post_device(&self, body: &DeviceRegistration<'_>) -> Result<(), Error> {
        self.post(DEVICES_PATH, body).await
    }

    /// Upload one logger's daily generation total.
    pub async fn post_logger_power_gen(&self, body: &LoggerPowerGen<'_>) -> Result<(), Error> {
        self.post(LOGGER_POWER_GEN_PATH, body).await
    }

    async fn post(&self, path: &str, body: &(impl Serialize + Sync)) -> Result<(), Error> {
        let url = join_path(&self.base_url, path)?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Token {}", self.api_token.expose_secret()),
            )
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(Error::Ingest {
                status: status.as_u16(),
                message: preview(&text).to_owned(),
            });
        }

        trace!(status = status.as_u16(), body = preview(&text), "ingestion accepted");
        Ok(())
    }
}
