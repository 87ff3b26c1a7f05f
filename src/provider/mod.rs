//! Notification provider abstraction.
//!
//! The gateway never talks to the cloud service directly; every outbound call
//! goes through [`NotificationProvider`]. Two implementations exist:
//!
//! - `SnsProvider`: Amazon SNS through the AWS SDK (default)
//! - `MemoryProvider`: in-process bookkeeping for local development and tests
//!
//! Use `create_provider()` to build the one selected by configuration.

mod memory;
mod sns;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{ProviderBackend, ProviderConfig, SeedTopic};
use crate::envelope::MessageEnvelope;

pub use memory::{MemoryProvider, ProviderCall};
pub use sns::SnsProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider request failed during {operation}: {message}")]
    Request {
        operation: &'static str,
        message: String,
    },

    #[error("Provider returned no {0}")]
    MissingField(&'static str),

    #[error("Provider resource not found: {0}")]
    NotFound(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Outbound operations against the notification service.
///
/// Implementations must be thread-safe (`Send + Sync`); a single instance is
/// shared by every request handler.
#[async_trait]
pub trait NotificationProvider: Send + Sync {
    /// Short backend name used in logs and health output.
    fn name(&self) -> &'static str;

    /// Allocate a provider-side topic, returning its identifier.
    async fn create_topic(&self, name: &str) -> ProviderResult<String>;

    async fn delete_topic(&self, topic_id: &str) -> ProviderResult<()>;

    /// Publish an envelope to a topic. Returns the provider message id when one
    /// is issued.
    async fn publish(
        &self,
        topic_id: &str,
        envelope: &MessageEnvelope,
    ) -> ProviderResult<Option<String>>;

    /// Register a device token under a platform application.
    async fn create_platform_endpoint(
        &self,
        application_id: &str,
        token: &str,
    ) -> ProviderResult<String>;

    /// Subscribe an endpoint to a topic.
    ///
    /// Returns `None` when the protocol needs out-of-band confirmation and no
    /// subscription id exists yet.
    async fn subscribe(
        &self,
        topic_id: &str,
        protocol: &str,
        endpoint: &str,
    ) -> ProviderResult<Option<String>>;
}

/// Create a notification provider based on configuration.
///
/// - `"sns"` (default): Returns an `SnsProvider` using the AWS default
///   credential chain
/// - `"memory"`: Returns a `MemoryProvider` that already knows the seeded topics
pub async fn create_provider(
    config: &ProviderConfig,
    seeds: &[SeedTopic],
) -> Arc<dyn NotificationProvider> {
    match config.backend {
        ProviderBackend::Sns => {
            tracing::info!(
                backend = "sns",
                region = %config.region,
                endpoint_url = ?config.endpoint_url,
                "Creating SNS notification provider"
            );
            Arc::new(SnsProvider::from_config(config).await)
        }
        ProviderBackend::Memory => {
            tracing::info!(backend = "memory", "Creating memory notification provider");
            let provider = MemoryProvider::new();
            for seed in seeds {
                provider.adopt_topic(&seed.arn, &seed.name);
            }
            Arc::new(provider)
        }
    }
}
