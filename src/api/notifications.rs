//! Publish, device registration and subscription endpoints.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use super::ApiQuery;
use crate::envelope::Message;
use crate::error::{GatewayError, Result};
use crate::publisher::{DeliveryStatus, DeviceRegistration, Subscription};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct PublishParams {
    pub topic: Option<String>,
}

/// Publish request body: `{"message": "text" | {..}}`
#[derive(Debug, Default, Deserialize)]
pub struct PublishBody {
    #[serde(default)]
    pub message: Value,
}

#[derive(Debug, Deserialize)]
pub struct RegisterParams {
    pub token: Option<String>,
    #[serde(rename = "type")]
    pub platform_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeParams {
    pub topic: Option<String>,
    pub protocol: Option<String>,
    #[serde(rename = "endpointArn")]
    pub endpoint_arn: Option<String>,
}

/// POST /publish?topic=.. - Publish a message to a topic
#[tracing::instrument(name = "http.publish", skip(state, body))]
pub async fn publish_message(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PublishParams>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<DeliveryStatus>> {
    let body = parse_publish_body(&body?)?;
    let message = Message::from_value(body.message);

    let status = state
        .publisher
        .publish(params.topic.as_deref(), message)
        .await?;
    Ok(Json(status))
}

/// GET|POST /register?token=..&type=ios|android - Register a device token
#[tracing::instrument(name = "http.register_device", skip(state, params))]
pub async fn register_device(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<RegisterParams>,
) -> Result<Json<DeviceRegistration>> {
    let registration = state
        .publisher
        .register_device(params.token.as_deref(), params.platform_type.as_deref())
        .await?;
    Ok(Json(registration))
}

/// POST /subscribe?topic=..&protocol=..&endpointArn=.. - Subscribe an endpoint
#[tracing::instrument(name = "http.subscribe", skip(state))]
pub async fn subscribe_endpoint(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SubscribeParams>,
) -> Result<Json<Subscription>> {
    let subscription = state
        .publisher
        .subscribe(
            params.topic.as_deref(),
            params.protocol.as_deref(),
            params.endpoint_arn.as_deref(),
        )
        .await?;
    Ok(Json(subscription))
}

/// An empty body means no message; anything else must be a JSON object.
fn parse_publish_body(body: &[u8]) -> Result<PublishBody> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(PublishBody::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| GatewayError::InvalidRequest(format!("invalid JSON body: {}", e)))
}
