//! End-to-end tests of the HTTP surface
//!
//! The router is driven in-process with the in-memory provider standing in
//! for SNS, so no network or AWS credentials are needed.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use topic_gateway::config::{PlatformConfig, Settings};
use topic_gateway::envelope::{Channel, Message, MessageEnvelope};
use topic_gateway::provider::{MemoryProvider, ProviderCall};
use topic_gateway::server::{create_app, AppState};

const IOS_APP: &str = "arn:aws:sns:local:000000000000:app/APNS/scores-ios";

struct TestGateway {
    app: Router,
    provider: Arc<MemoryProvider>,
}

fn gateway_with(settings: Settings) -> TestGateway {
    let provider = Arc::new(MemoryProvider::new());
    let state = AppState::with_provider(settings, provider.clone());
    TestGateway {
        app: create_app(state),
        provider,
    }
}

fn gateway() -> TestGateway {
    let settings = Settings {
        platforms: PlatformConfig {
            ios_application_arn: IOS_APP.to_string(),
            android_application_arn: String::new(),
        },
        ..Settings::default()
    };
    gateway_with(settings)
}

impl TestGateway {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    async fn call(&self, method: Method, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn publish(&self, topic: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("/publish?topic={}", topic))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn create(&self, name: &str) -> Value {
        let (status, body) = self
            .call(
                Method::POST,
                &format!("/create?name={}&display_name=Live%20Scores", name),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
        body
    }
}

// ============================================================================
// Topic registry
// ============================================================================

#[tokio::test]
async fn test_create_list_and_remove_topic() {
    let gw = gateway();

    let created = gw.create("scores").await;
    assert_eq!(created["name"], "scores");
    assert_eq!(created["displayName"], "Live Scores");
    let arn = created["topicArn"].as_str().unwrap().to_string();
    assert!(gw.provider.has_topic(&arn));

    let (status, topics) = gw.call(Method::GET, "/topics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(topics["scores"]["topicArn"], arn.as_str());

    let (status, body) = gw.call(Method::DELETE, "/remove?topic=scores").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "deleted");
    assert!(!gw.provider.has_topic(&arn));

    let (_, topics) = gw.call(Method::GET, "/topics").await;
    assert_eq!(topics, json!({}));
}

#[tokio::test]
async fn test_create_duplicate_topic_conflicts() {
    let gw = gateway();
    gw.create("scores").await;

    let (status, body) = gw
        .call(Method::POST, "/create?name=scores&display_name=Other")
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body,
        json!({"error": "DUPLICATE_TOPIC_NAME", "info": ["scores"]})
    );
    assert_eq!(gw.provider.call_count(), 1);
}

#[tokio::test]
async fn test_create_reports_every_missing_parameter() {
    let gw = gateway();

    let (status, body) = gw.call(Method::POST, "/create?name=").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "MISSING_REQUIRED_PARAMETER");
    assert_eq!(body["info"], json!(["name", "display_name"]));
    assert_eq!(gw.provider.call_count(), 0);
}

#[tokio::test]
async fn test_remove_unknown_topic() {
    let gw = gateway();

    let (status, body) = gw.call(Method::DELETE, "/remove?topic=missing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "UNKNOWN_TOPIC", "info": ["missing"]}));
}

#[tokio::test]
async fn test_seed_topics_are_listed() {
    let mut settings = Settings::default();
    settings.topics = vec![topic_gateway::config::SeedTopic {
        name: "news".to_string(),
        display_name: "News".to_string(),
        arn: "arn:aws:sns:us-west-2:000000000000:news".to_string(),
    }];
    let gw = gateway_with(settings);

    let (status, topics) = gw.call(Method::GET, "/topics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(topics["news"]["displayName"], "News");
    assert_eq!(gw.provider.call_count(), 0);
}

// ============================================================================
// Publish
// ============================================================================

#[tokio::test]
async fn test_publish_text_message() {
    let gw = gateway();
    let arn = gw.create("scores").await["topicArn"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, body) = gw.publish("scores", json!({"message": "hello"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "published");
    assert!(body["messageId"].is_string());

    let expected = MessageEnvelope::build(&Message::Text("hello".to_string()));
    assert_eq!(
        gw.provider.calls().last(),
        Some(&ProviderCall::Publish {
            topic_id: arn,
            envelope: expected,
        })
    );
}

#[tokio::test]
async fn test_publish_structured_message_fans_out_channels() {
    let gw = gateway();
    gw.create("scores").await;

    let (status, _) = gw
        .publish("scores", json!({"message": {"alert": "Goal!", "badge": 1, "match": 7}}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let Some(ProviderCall::Publish { envelope, .. }) = gw.provider.calls().pop() else {
        panic!("expected a publish call");
    };
    assert_eq!(envelope.get(Channel::Default), Some("Goal!"));
    let apns = envelope.get_json(Channel::Apns).unwrap();
    assert_eq!(apns["aps"]["badge"], 1);
    assert_eq!(apns["aps"]["data"], json!({"match": 7}));
    let gcm = envelope.get_json(Channel::Gcm).unwrap();
    assert_eq!(gcm["data"]["alert"], "Goal!");
}

#[tokio::test]
async fn test_publish_to_unknown_topic_skips_provider() {
    let gw = gateway();

    let (status, body) = gw.publish("nope", json!({"message": "hello"})).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "UNKNOWN_TOPIC", "info": ["nope"]}));
    assert_eq!(gw.provider.call_count(), 0);
}

#[tokio::test]
async fn test_publish_without_message() {
    let gw = gateway();
    gw.create("scores").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/publish?topic=scores")
        .body(Body::empty())
        .unwrap();
    let (status, body) = gw.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "MISSING_REQUIRED_PARAMETER", "info": ["message"]})
    );
}

#[tokio::test]
async fn test_publish_invalid_json_body() {
    let gw = gateway();
    gw.create("scores").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/publish?topic=scores")
        .body(Body::from("{broken"))
        .unwrap();
    let (status, body) = gw.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_publish_provider_failure_is_bad_gateway() {
    let gw = gateway();
    gw.create("scores").await;
    gw.provider.fail_operation("publish");

    let (status, body) = gw.publish("scores", json!({"message": "hello"})).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "PUBLISH_FAILED", "info": []}));

    let (_, stats) = gw.call(Method::GET, "/stats").await;
    assert_eq!(stats["notifications"]["publish_failed"], 1);
}

#[tokio::test]
async fn test_publish_oversized_body() {
    let gw = gateway();
    gw.create("scores").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/publish?topic=scores")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"message": "x".repeat(300 * 1024)}).to_string(),
        ))
        .unwrap();
    let (status, body) = gw.send(request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({"error": "PAYLOAD_TOO_LARGE", "info": []}));
    assert_eq!(gw.provider.call_count(), 1);
}

// ============================================================================
// Devices and subscriptions
// ============================================================================

#[tokio::test]
async fn test_register_ios_device() {
    let gw = gateway();

    let (status, body) = gw
        .call(Method::POST, "/register?token=abc123&type=ios")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["endpointArn"].as_str().unwrap().starts_with(IOS_APP));

    // GET is accepted too and the same token maps to the same endpoint
    let (status, again) = gw.call(Method::GET, "/register?token=abc123&type=ios").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["endpointArn"], body["endpointArn"]);
}

#[tokio::test]
async fn test_register_unconfigured_platform() {
    let gw = gateway();

    let (status, body) = gw
        .call(Method::POST, "/register?token=abc123&type=android")
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({"error": "PLATFORM_NOT_CONFIGURED", "info": ["android"]})
    );
    assert_eq!(gw.provider.call_count(), 0);
}

#[tokio::test]
async fn test_register_duplicate_query_key() {
    let gw = gateway();

    let (status, body) = gw
        .call(Method::POST, "/register?token=a&token=b&type=ios")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_REQUEST");
    assert!(body["info"][0].as_str().unwrap().contains("token"));
    assert_eq!(gw.provider.call_count(), 0);
}

#[tokio::test]
async fn test_register_unknown_device_type() {
    let gw = gateway();

    let (status, body) = gw
        .call(Method::POST, "/register?token=abc123&type=blackberry")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "UNKNOWN_DEVICE_TYPE", "info": ["blackberry"]})
    );
}

#[tokio::test]
async fn test_subscribe_registered_device() {
    let gw = gateway();
    gw.create("scores").await;
    let (_, device) = gw
        .call(Method::POST, "/register?token=abc123&type=ios")
        .await;
    let endpoint = device["endpointArn"].as_str().unwrap();

    let (status, body) = gw
        .call(
            Method::POST,
            &format!(
                "/subscribe?topic=scores&protocol=application&endpointArn={}",
                endpoint
            ),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["subscriptionArn"].is_string());
    assert_eq!(gw.provider.subscription_count(), 1);
}

#[tokio::test]
async fn test_subscribe_pending_confirmation() {
    let gw = gateway();
    gw.create("scores").await;

    let (status, body) = gw
        .call(
            Method::POST,
            "/subscribe?topic=scores&protocol=email&endpointArn=fan%40example.com",
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_subscribe_missing_protocol() {
    let gw = gateway();
    gw.create("scores").await;

    let (status, body) = gw
        .call(Method::POST, "/subscribe?topic=scores&endpointArn=arn:x")
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "MISSING_REQUIRED_PARAMETER", "info": ["protocol"]})
    );
}

// ============================================================================
// Auth, health and metrics
// ============================================================================

#[tokio::test]
async fn test_api_key_guards_mutating_routes() {
    let mut settings = Settings::default();
    settings.api.key = Some("secret".to_string());
    let gw = gateway_with(settings);

    let (status, body) = gw
        .call(Method::POST, "/create?name=scores&display_name=Scores")
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
    assert_eq!(gw.provider.call_count(), 0);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/create?name=scores&display_name=Scores")
        .header("X-API-Key", "secret")
        .body(Body::empty())
        .unwrap();
    let (status, _) = gw.send(request).await;
    assert_eq!(status, StatusCode::CREATED);

    // Read-only routes stay open
    let (status, _) = gw.call(Method::GET, "/topics").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_root_and_health() {
    let gw = gateway();
    gw.create("scores").await;

    let (status, body) = gw.call(Method::GET, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("Hello, world\n".to_string()));

    let (status, health) = gw.call(Method::GET, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["provider"], "memory");
    assert_eq!(health["topics"], 1);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let gw = gateway();
    gw.create("scores").await;

    let (status, body) = gw.call(Method::GET, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().unwrap();
    assert!(text.contains("topic_gateway_topics_registered"));
    assert!(text.contains("topic_gateway_topic_operations_total"));
}
