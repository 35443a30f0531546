// NetEco open API HTTP client
//
// Wraps `reqwest::Client` with NetEco-specific URL construction and
// envelope classification. Endpoint methods live in sibling modules
// (`auth`, `plants`) as inherent impls to keep this module focused on
// transport mechanics.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{Error, preview};
use crate::neteco::models::{Envelope, VendorResponse};
use crate::transport::{TransportConfig, join_path};

/// Query parameter carrying the session token on authenticated calls.
pub(crate) const TOKEN_PARAM: &str = "openApiroarand";

/// Raw HTTP client for a NetEco-style monitoring API.
///
/// Stateless with respect to authentication: the token is passed into
/// every authenticated call, so session ownership stays with the caller.
/// All calls are `POST` with query-string parameters.
pub struct NetEcoClient {
    http: reqwest::Client,
    base_url: Url,
}

impl NetEcoClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the API root (e.g. `https://neteco.example.com/openApi`);
    /// endpoint names are appended to it.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn endpoint(&self, function: &str) -> Result<Url, Error> {
        join_path(&self.base_url, function)
    }

    /// POST an authenticated query and classify the envelope.
    pub(crate) async fn query<T: DeserializeOwned>(
        &self,
        function: &str,
        token: &str,
        params: &[(&str, &str)],
    ) -> Result<VendorResponse<T>, Error> {
        let url = self.endpoint(function)?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .query(&[(TOKEN_PARAM, token)])
            .query(params)
            .send()
            .await?;

        parse_envelope(resp).await
    }
}

/// Parse the `{ success, failCode, resultData }` envelope.
///
/// HTTP 401 is reported as [`Error::SessionExpired`]; other non-2xx
/// statuses as [`Error::Http`]. A body that is not a JSON envelope is an
/// [`Error::Deserialization`].
async fn parse_envelope<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<VendorResponse<T>, Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::SessionExpired);
    }

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Http {
            status: status.as_u16(),
            message: preview(&body).to_owned(),
        });
    }

    let body = resp.text().await?;

    let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body: body.clone(),
    })?;

    Ok(VendorResponse::from(envelope))
}
