#![allow(clippy::unwrap_used)]
// Session lifecycle tests: backoff, expiry, and server-side invalidation.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use solarsync_api::NetEcoClient;
use solarsync_core::{
    AuthPolicy, CoreError, CredentialSet, Enumerator, ManualClock, RecordingSleeper, RetryPolicy,
    SessionManager,
};

// ── Helpers ─────────────────────────────────────────────────────────

struct Harness {
    server: MockServer,
    clock: ManualClock,
    sleeper: RecordingSleeper,
    session: SessionManager,
}

async fn setup(retry: RetryPolicy) -> Harness {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/openApi", server.uri())).unwrap();
    let clock = ManualClock::new(DateTime::<Utc>::UNIX_EPOCH);
    let sleeper = RecordingSleeper::advancing(clock.clone());

    let session = SessionManager::new(
        NetEcoClient::with_client(reqwest::Client::new(), base_url.clone()),
        CredentialSet {
            host: "site-a".into(),
            base_url,
            username: "api-user".into(),
            password: "hunter2".to_string().into(),
        },
        AuthPolicy {
            token_validity: Duration::from_secs(30 * 60),
            retry,
        },
        Arc::new(clock.clone()),
        Arc::new(sleeper.clone()),
    );

    Harness {
        server,
        clock,
        sleeper,
        session,
    }
}

fn token(value: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "openApiroarand": value }))
}

fn online_limit() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": false,
        "failCode": 20400,
        "message": "USER_ONLINE_LIMIT"
    }))
}

// ── Login retry ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_backs_off_then_succeeds() {
    let h = setup(RetryPolicy::default()).await;

    Mock::given(method("POST"))
        .and(path("/openApi/login"))
        .respond_with(online_limit())
        .up_to_n_times(2)
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/openApi/login"))
        .respond_with(token("tok-1"))
        .expect(1)
        .mount(&h.server)
        .await;

    let session = h.session.login().await.unwrap();

    assert_eq!(session.token(), "tok-1");
    assert_eq!(
        h.sleeper.pauses(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
}

#[tokio::test]
async fn test_login_gives_up_after_max_attempts() {
    let h = setup(RetryPolicy {
        backoff_base: 2,
        max_attempts: 4,
    })
    .await;

    Mock::given(method("POST"))
        .and(path("/openApi/login"))
        .respond_with(online_limit())
        .expect(4)
        .mount(&h.server)
        .await;

    let result = h.session.login().await;

    assert!(
        matches!(result, Err(CoreError::LoginRetriesExhausted { attempts: 4 })),
        "got: {result:?}"
    );
    let pauses = h.sleeper.pauses();
    assert_eq!(
        pauses,
        vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(4)
        ]
    );
    assert!(pauses.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_rejected_login_is_not_retried() {
    let h = setup(RetryPolicy::default()).await;

    Mock::given(method("POST"))
        .and(path("/openApi/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "failCode": 20001,
            "message": "USERNAME_OR_PASSWORD_ERROR"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let result = h.session.login().await;

    assert!(
        matches!(result, Err(CoreError::AuthenticationFailed { .. })),
        "got: {result:?}"
    );
    assert!(h.sleeper.pauses().is_empty());
}

// ── Expiry ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_token_reused_within_window() {
    let h = setup(RetryPolicy::default()).await;

    Mock::given(method("POST"))
        .and(path("/openApi/login"))
        .respond_with(token("tok-1"))
        .expect(1)
        .mount(&h.server)
        .await;

    let first = h.session.ensure_valid().await.unwrap();
    h.clock.advance(Duration::from_secs(29 * 60));
    let second = h.session.ensure_valid().await.unwrap();

    assert_eq!(first.token(), "tok-1");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_stale_token_triggers_one_relogin() {
    let h = setup(RetryPolicy::default()).await;

    Mock::given(method("POST"))
        .and(path("/openApi/login"))
        .respond_with(token("tok-1"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/openApi/login"))
        .respond_with(token("tok-2"))
        .expect(1)
        .mount(&h.server)
        .await;

    h.session.ensure_valid().await.unwrap();
    h.clock.advance(Duration::from_secs(31 * 60));
    let refreshed = h.session.ensure_valid().await.unwrap();
    let again = h.session.ensure_valid().await.unwrap();

    assert_eq!(refreshed.token(), "tok-2");
    assert_eq!(again.token(), "tok-2");
}

#[tokio::test]
async fn test_invalidate_forces_relogin() {
    let h = setup(RetryPolicy::default()).await;

    Mock::given(method("POST"))
        .and(path("/openApi/login"))
        .respond_with(token("tok-1"))
        .expect(2)
        .mount(&h.server)
        .await;

    h.session.ensure_valid().await.unwrap();
    h.session.invalidate().await;
    h.session.ensure_valid().await.unwrap();
}

#[tokio::test]
async fn test_server_side_expiry_reissues_call_once() {
    let h = setup(RetryPolicy::default()).await;

    Mock::given(method("POST"))
        .and(path("/openApi/login"))
        .respond_with(token("tok-1"))
        .up_to_n_times(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/openApi/login"))
        .respond_with(token("tok-2"))
        .expect(1)
        .mount(&h.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/openApi/queryPlantList"))
        .and(query_param("openApiroarand", "tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "failCode": 305,
            "message": "USER_MUST_RELOGIN"
        })))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/openApi/queryPlantList"))
        .and(query_param("openApiroarand", "tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resultData": [{ "plantid": "P1", "plantName": "Kobe" }]
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    h.session.login().await.unwrap();
    let plants = Enumerator::new(&h.session).list_plants().await.unwrap();

    assert_eq!(plants.len(), 1);
    assert_eq!(plants[0].name, "Kobe");
}

#[tokio::test]
async fn test_logout_without_session_is_noop() {
    let h = setup(RetryPolicy::default()).await;

    Mock::given(method("POST"))
        .and(path("/openApi/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    h.session.logout().await.unwrap();
}
