#![allow(clippy::unwrap_used)]
// Integration tests for `IngestClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use solarsync_api::{
    DeviceRegistration, Error, IngestClient, LoggerPowerGen, PlantRegistration,
};

async fn setup() -> (MockServer, IngestClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let client = IngestClient::with_client(
        reqwest::Client::new(),
        base_url,
        "ingest-key".to_string().into(),
    );
    (server, client)
}

#[tokio::test]
async fn test_post_plant() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/core/powerplants/"))
        .and(header("authorization", "Token ingest-key"))
        .and(body_json(json!({ "plant_id": "P1", "plant_name": "Kobe" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .post_plant(&PlantRegistration {
            plant_id: "P1",
            plant_name: "Kobe",
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_post_device() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/core/devices/"))
        .and(body_json(json!({
            "plant_id": "P1",
            "plant_name": "Kobe",
            "logger_name": "SL-01",
            "device_id": "D1",
            "device_name": "INV-1"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    client
        .post_device(&DeviceRegistration {
            plant_id: "P1",
            plant_name: "Kobe",
            logger_name: "SL-01",
            device_id: "D1",
            device_name: "INV-1",
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_post_logger_power_gen() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/core/logger-power-gen/"))
        .and(body_json(json!({ "logger_name": "SL-01", "power_gen": 15.5 })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    client
        .post_logger_power_gen(&LoggerPowerGen {
            logger_name: "SL-01",
            power_gen: 15.5,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_rejected_post() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/core/logger-power-gen/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "power_gen": ["too many digits"] })),
        )
        .mount(&server)
        .await;

    let result = client
        .post_logger_power_gen(&LoggerPowerGen {
            logger_name: "SL-01",
            power_gen: 1.0,
        })
        .await;

    match result {
        Err(Error::Ingest { status, message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("too many digits"));
        }
        other => panic!("expected Ingest error, got: {other:?}"),
    }
}
