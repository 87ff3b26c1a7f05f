//! Publishing, device registration and subscription.
//!
//! Every operation checks its required inputs, resolves topics through the
//! [`TopicRegistry`] and then makes exactly one provider call. Nothing is
//! retried; a failed provider call is reported once.

mod types;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::PlatformConfig;
use crate::envelope::{Message, MessageEnvelope};
use crate::error::{require_params, GatewayError, Result};
use crate::metrics::{DeviceMetrics, MessageMetrics, SubscriptionMetrics};
use crate::provider::NotificationProvider;
use crate::topic::TopicRegistry;

pub use types::{
    DeliveryStatus, DevicePlatform, DeviceRegistration, PublisherStatsSnapshot, Subscription,
};

/// Statistics for the publisher
#[derive(Debug, Default)]
pub struct PublisherStats {
    pub published: AtomicU64,
    pub publish_failed: AtomicU64,
    pub devices_registered: AtomicU64,
    pub subscriptions: AtomicU64,
}

impl PublisherStats {
    pub fn snapshot(&self) -> PublisherStatsSnapshot {
        PublisherStatsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            publish_failed: self.publish_failed.load(Ordering::Relaxed),
            devices_registered: self.devices_registered.load(Ordering::Relaxed),
            subscriptions: self.subscriptions.load(Ordering::Relaxed),
        }
    }
}

pub struct NotificationPublisher {
    registry: Arc<TopicRegistry>,
    provider: Arc<dyn NotificationProvider>,
    platforms: PlatformConfig,
    stats: PublisherStats,
}

impl NotificationPublisher {
    pub fn new(
        registry: Arc<TopicRegistry>,
        provider: Arc<dyn NotificationProvider>,
        platforms: PlatformConfig,
    ) -> Self {
        Self {
            registry,
            provider,
            platforms,
            stats: PublisherStats::default(),
        }
    }

    pub fn stats(&self) -> PublisherStatsSnapshot {
        self.stats.snapshot()
    }

    /// Publish a message to a registered topic.
    ///
    /// Provider failures are logged and reported as `PublishFailed` without
    /// their detail.
    #[tracing::instrument(name = "publisher.publish", skip(self, message))]
    pub async fn publish(
        &self,
        topic: Option<&str>,
        message: Option<Message>,
    ) -> Result<DeliveryStatus> {
        let message = message.filter(|m| !matches!(m, Message::Text(text) if text.is_empty()));
        let (topic, message) = match (topic.filter(|t| !t.is_empty()), message) {
            (Some(topic), Some(message)) => (topic, message),
            (topic, message) => {
                let mut missing = Vec::new();
                if topic.is_none() {
                    missing.push("topic".to_string());
                }
                if message.is_none() {
                    missing.push("message".to_string());
                }
                return Err(GatewayError::MissingParameter(missing));
            }
        };

        let target = self.registry.lookup(topic)?;
        let envelope = MessageEnvelope::build(&message);

        match self.provider.publish(&target.topic_arn, &envelope).await {
            Ok(message_id) => {
                self.stats.published.fetch_add(1, Ordering::Relaxed);
                MessageMetrics::record_published(message.kind());
                tracing::info!(
                    topic = %topic,
                    kind = message.kind(),
                    message_id = ?message_id,
                    "Message published"
                );
                Ok(DeliveryStatus::published(message_id))
            }
            Err(e) => {
                self.stats.publish_failed.fetch_add(1, Ordering::Relaxed);
                MessageMetrics::record_failed();
                tracing::error!(
                    topic = %topic,
                    topic_arn = %target.topic_arn,
                    error = %e,
                    "Error publishing message"
                );
                Err(GatewayError::PublishFailed(e))
            }
        }
    }

    /// Register a device token with the platform application for its type.
    #[tracing::instrument(name = "publisher.register_device", skip(self, token))]
    pub async fn register_device(
        &self,
        token: Option<&str>,
        platform_type: Option<&str>,
    ) -> Result<DeviceRegistration> {
        let [token, platform_type] = require_params([("token", token), ("type", platform_type)])?;

        let platform = DevicePlatform::parse(platform_type)
            .ok_or_else(|| GatewayError::UnknownDeviceType(platform_type.to_string()))?;

        let application_arn = self.application_arn(platform);
        if application_arn.is_empty() {
            return Err(GatewayError::PlatformNotConfigured(
                platform.as_str().to_string(),
            ));
        }

        let endpoint_arn = self
            .provider
            .create_platform_endpoint(application_arn, token)
            .await
            .map_err(|e| {
                tracing::error!(platform = %platform, error = %e, "Error registering device");
                GatewayError::Provider(e)
            })?;

        self.stats.devices_registered.fetch_add(1, Ordering::Relaxed);
        DeviceMetrics::record_registered(platform.as_str());
        tracing::info!(platform = %platform, endpoint_arn = %endpoint_arn, "Device registered");

        Ok(DeviceRegistration { endpoint_arn })
    }

    /// Subscribe an endpoint to a registered topic.
    #[tracing::instrument(name = "publisher.subscribe", skip(self))]
    pub async fn subscribe(
        &self,
        topic: Option<&str>,
        protocol: Option<&str>,
        endpoint: Option<&str>,
    ) -> Result<Subscription> {
        let [topic, protocol, endpoint] = require_params([
            ("topic", topic),
            ("protocol", protocol),
            ("endpointArn", endpoint),
        ])?;

        let target = self.registry.lookup(topic)?;

        let subscription_arn = self
            .provider
            .subscribe(&target.topic_arn, protocol, endpoint)
            .await
            .map_err(|e| {
                tracing::error!(topic = %topic, protocol = %protocol, error = %e, "Error subscribing to topic");
                GatewayError::Provider(e)
            })?;

        self.stats.subscriptions.fetch_add(1, Ordering::Relaxed);
        SubscriptionMetrics::record(protocol, subscription_arn.is_some());
        tracing::info!(
            topic = %topic,
            protocol = %protocol,
            subscription_arn = ?subscription_arn,
            "Endpoint subscribed"
        );

        Ok(Subscription { subscription_arn })
    }

    fn application_arn(&self, platform: DevicePlatform) -> &str {
        match platform {
            DevicePlatform::Ios => &self.platforms.ios_application_arn,
            DevicePlatform::Android => &self.platforms.android_application_arn,
        }
    }
}
