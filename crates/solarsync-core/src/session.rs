// ── Session / token manager ──
//
// Owns the single vendor session for one credential set. Every
// authenticated call goes through `ensure_valid`, which re-logs in when
// the token is absent or older than the validity window. Login retries
// on the concurrent-session limit with exponential backoff.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use solarsync_api::NetEcoClient;

use crate::clock::{Clock, Sleeper};
use crate::config::{AuthPolicy, CredentialSet};
use crate::error::CoreError;

// ── Session ──────────────────────────────────────────────────────────

/// A vendor token and the instant it was issued.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    issued_at: DateTime<Utc>,
    validity: Duration,
}

impl Session {
    pub fn new(token: String, issued_at: DateTime<Utc>, validity: Duration) -> Self {
        Self {
            token,
            issued_at,
            validity,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        let validity = chrono::Duration::from_std(self.validity).unwrap_or(chrono::Duration::MAX);
        self.issued_at
            .checked_add_signed(validity)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Stale once `now` is past `issued_at + validity`.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("validity", &self.validity)
            .finish()
    }
}

// ── SessionManager ───────────────────────────────────────────────────

/// Per-credential-set session owner. Not shared across sets.
pub struct SessionManager {
    client: NetEcoClient,
    credentials: CredentialSet,
    policy: AuthPolicy,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
    current: Mutex<Option<Session>>,
}

impl SessionManager {
    pub fn new(
        client: NetEcoClient,
        credentials: CredentialSet,
        policy: AuthPolicy,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            client,
            credentials,
            policy,
            clock,
            sleeper,
            current: Mutex::new(None),
        }
    }

    /// The vendor client sessions are issued for.
    pub fn client(&self) -> &NetEcoClient {
        &self.client
    }

    pub fn host(&self) -> &str {
        &self.credentials.host
    }

    /// Log in unconditionally, replacing any current session.
    pub async fn login(&self) -> Result<Session, CoreError> {
        let mut current = self.current.lock().await;
        let session = self.authenticate().await?;
        *current = Some(session.clone());
        Ok(session)
    }

    /// Return the current session, logging in first if it is absent or
    /// stale.
    pub async fn ensure_valid(&self) -> Result<Session, CoreError> {
        let mut current = self.current.lock().await;
        if let Some(session) = current.as_ref() {
            if !session.is_stale(self.clock.now()) {
                return Ok(session.clone());
            }
            debug!(host = %self.credentials.host, "session stale, re-authenticating");
        }
        let session = self.authenticate().await?;
        *current = Some(session.clone());
        Ok(session)
    }

    /// Force the next [`ensure_valid`](Self::ensure_valid) to log in again.
    pub async fn invalidate(&self) {
        *self.current.lock().await = None;
    }

    /// Drop the current session only if it still carries `token`. A
    /// refresh that already happened is left alone.
    async fn invalidate_if(&self, token: &str) {
        let mut current = self.current.lock().await;
        if current.as_ref().is_some_and(|s| s.token() == token) {
            *current = None;
        }
    }

    /// Run an authenticated call. If the server reports the session as
    /// expired, the session is refreshed and the call re-issued once.
    pub async fn authorized<T, F, Fut>(&self, op: F) -> Result<T, CoreError>
    where
        F: Fn(Session) -> Fut,
        Fut: Future<Output = Result<T, solarsync_api::Error>>,
    {
        let session = self.ensure_valid().await?;
        let token = session.token().to_owned();
        match op(session).await {
            Err(e) if e.is_auth_expired() => {
                info!(host = %self.credentials.host, "session expired server-side, re-authenticating");
                self.invalidate_if(&token).await;
                let session = self.ensure_valid().await?;
                Ok(op(session).await?)
            }
            other => Ok(other?),
        }
    }

    /// End the current session, if any. Best-effort at the call site.
    pub async fn logout(&self) -> Result<(), CoreError> {
        let Some(session) = self.current.lock().await.take() else {
            return Ok(());
        };
        self.client.logout(session.token()).await?;
        debug!(host = %self.credentials.host, "logged out");
        Ok(())
    }

    /// Login with bounded backoff on the concurrent-session limit.
    async fn authenticate(&self) -> Result<Session, CoreError> {
        let retry = self.policy.retry;
        let max_attempts = retry.max_attempts.max(1);
        let mut attempt: u32 = 0;

        loop {
            match self
                .client
                .login(&self.credentials.username, &self.credentials.password)
                .await
            {
                Ok(token) => {
                    info!(host = %self.credentials.host, attempt = attempt + 1, "logged in");
                    return Ok(Session::new(
                        token,
                        self.clock.now(),
                        self.policy.token_validity,
                    ));
                }
                Err(e) if e.is_concurrent_session_limit() => {
                    attempt += 1;
                    if attempt >= max_attempts {
                        warn!(
                            host = %self.credentials.host,
                            attempts = attempt,
                            "concurrent session limit, giving up"
                        );
                        return Err(CoreError::LoginRetriesExhausted { attempts: attempt });
                    }
                    let delay = retry.delay(attempt - 1);
                    warn!(
                        host = %self.credentials.host,
                        attempt,
                        delay_secs = delay.as_secs(),
                        "concurrent session limit, backing off"
                    );
                    self.sleeper.sleep(delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
