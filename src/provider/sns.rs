//! Amazon SNS provider.

use std::time::Instant;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sns::config::Region;
use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::Client as SnsClient;

use super::{NotificationProvider, ProviderError, ProviderResult};
use crate::config::ProviderConfig;
use crate::envelope::MessageEnvelope;
use crate::metrics::ProviderMetrics;

/// Message structure that tells SNS the message is a per-protocol JSON map.
const MESSAGE_STRUCTURE_JSON: &str = "json";

/// Subscription ARN placeholder returned while confirmation is outstanding,
/// compared with whitespace removed ("pending confirmation", "PendingConfirmation").
const PENDING_CONFIRMATION: &str = "pendingconfirmation";

pub struct SnsProvider {
    client: SnsClient,
}

impl SnsProvider {
    /// Build a client from the AWS default credential chain.
    ///
    /// Credentials come from the environment, the shared credentials file or
    /// an instance / task role; they are never read from gateway settings.
    pub async fn from_config(config: &ProviderConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let Some(url) = &config.endpoint_url {
            loader = loader.endpoint_url(url);
        }

        let sdk_config = loader.load().await;
        Self::new(SnsClient::new(&sdk_config))
    }

    pub fn new(client: SnsClient) -> Self {
        Self { client }
    }
}

fn request_error<E>(operation: &'static str, err: E) -> ProviderError
where
    E: std::error::Error,
{
    ProviderError::Request {
        operation,
        message: DisplayErrorContext(err).to_string(),
    }
}

fn is_pending(arn: &str) -> bool {
    let compact: String = arn.chars().filter(|c| !c.is_whitespace()).collect();
    compact.eq_ignore_ascii_case(PENDING_CONFIRMATION)
}

/// Normalize the subscription ARN returned by SNS.
fn confirmed_subscription(arn: Option<&str>) -> Option<String> {
    match arn {
        Some(arn) if !arn.is_empty() && !is_pending(arn) => Some(arn.to_string()),
        _ => None,
    }
}

#[async_trait]
impl NotificationProvider for SnsProvider {
    fn name(&self) -> &'static str {
        "sns"
    }

    async fn create_topic(&self, name: &str) -> ProviderResult<String> {
        let start = Instant::now();
        let result = self.client.create_topic().name(name).send().await;
        ProviderMetrics::observe("create_topic", start.elapsed());

        let output = result.map_err(|e| request_error("create_topic", e))?;
        output
            .topic_arn()
            .filter(|arn| !arn.is_empty())
            .map(str::to_string)
            .ok_or(ProviderError::MissingField("topic ARN"))
    }

    async fn delete_topic(&self, topic_id: &str) -> ProviderResult<()> {
        let start = Instant::now();
        let result = self.client.delete_topic().topic_arn(topic_id).send().await;
        ProviderMetrics::observe("delete_topic", start.elapsed());

        result.map_err(|e| request_error("delete_topic", e))?;
        Ok(())
    }

    async fn publish(
        &self,
        topic_id: &str,
        envelope: &MessageEnvelope,
    ) -> ProviderResult<Option<String>> {
        let message = envelope.to_message();

        let start = Instant::now();
        let result = self
            .client
            .publish()
            .topic_arn(topic_id)
            .message(message)
            .message_structure(MESSAGE_STRUCTURE_JSON)
            .send()
            .await;
        ProviderMetrics::observe("publish", start.elapsed());

        let output = result.map_err(|e| request_error("publish", e))?;
        Ok(output.message_id().map(str::to_string))
    }

    async fn create_platform_endpoint(
        &self,
        application_id: &str,
        token: &str,
    ) -> ProviderResult<String> {
        let start = Instant::now();
        let result = self
            .client
            .create_platform_endpoint()
            .platform_application_arn(application_id)
            .token(token)
            .send()
            .await;
        ProviderMetrics::observe("create_platform_endpoint", start.elapsed());

        let output = result.map_err(|e| request_error("create_platform_endpoint", e))?;
        output
            .endpoint_arn()
            .filter(|arn| !arn.is_empty())
            .map(str::to_string)
            .ok_or(ProviderError::MissingField("endpoint ARN"))
    }

    async fn subscribe(
        &self,
        topic_id: &str,
        protocol: &str,
        endpoint: &str,
    ) -> ProviderResult<Option<String>> {
        let start = Instant::now();
        let result = self
            .client
            .subscribe()
            .topic_arn(topic_id)
            .protocol(protocol)
            .endpoint(endpoint)
            .send()
            .await;
        ProviderMetrics::observe("subscribe", start.elapsed());

        let output = result.map_err(|e| request_error("subscribe", e))?;
        Ok(confirmed_subscription(output.subscription_arn()))
    }
}
