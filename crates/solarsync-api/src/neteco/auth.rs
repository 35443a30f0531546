// NetEco authentication
//
// Token-based login/logout. The login call returns an opaque token that
// every other call carries as the `openApiroarand` query parameter.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::{Error, preview};
use crate::neteco::client::{NetEcoClient, TOKEN_PARAM};
use crate::neteco::models::{FAIL_CODE_CONCURRENT_LOGIN, LoginResponse};

impl NetEcoClient {
    /// Authenticate and return a fresh session token.
    ///
    /// `POST {base}/login?userName=..&password=..`
    ///
    /// A response carrying fail code 20400 (online user limit) yields
    /// [`Error::ConcurrentSessionLimit`] whatever the HTTP status, so the
    /// caller can back off and retry. Every other refusal is
    /// [`Error::Authentication`].
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<String, Error> {
        let url = self.endpoint("login")?;
        debug!("logging in at {}", url);

        let resp = self
            .http()
            .post(url)
            .query(&[
                ("userName", username),
                ("password", password.expose_secret()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        let parsed = serde_json::from_str::<LoginResponse>(&body).ok();

        if let Some(ref login) = parsed {
            if login.fail_code == Some(FAIL_CODE_CONCURRENT_LOGIN) {
                return Err(Error::ConcurrentSessionLimit {
                    message: login
                        .message
                        .clone()
                        .unwrap_or_else(|| "online user limit reached".into()),
                });
            }
        }

        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", preview(&body)),
            });
        }

        let Some(login) = parsed else {
            return Err(Error::Authentication {
                message: format!("unrecognized login response: {}", preview(&body)),
            });
        };

        match login.token {
            Some(token) if !token.trim().is_empty() && login.success != Some(false) => {
                debug!("login successful");
                Ok(token)
            }
            _ => Err(Error::Authentication {
                message: login.message.unwrap_or_else(|| match login.fail_code {
                    Some(code) => format!("login rejected (failCode {code})"),
                    None => "login response carried no token".into(),
                }),
            }),
        }
    }

    /// End the session identified by `token`.
    ///
    /// `POST {base}/logout?openApiroarand=..`. The response body is not
    /// inspected; only transport failures and non-2xx statuses are errors.
    pub async fn logout(&self, token: &str) -> Result<(), Error> {
        let url = self.endpoint("logout")?;
        debug!("logging out at {}", url);

        let resp = self
            .http()
            .post(url)
            .query(&[(TOKEN_PARAM, token)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                message: "logout rejected".into(),
            });
        }

        debug!("logout complete");
        Ok(())
    }
}
