//! In-memory notification provider.
//!
//! Keeps topics, endpoints and subscriptions in `DashMap`s and records every
//! call it receives. Nothing leaves the process, so it backs local development
//! (`provider.backend = "memory"`) and the test suite.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;

use super::{NotificationProvider, ProviderError, ProviderResult};
use crate::envelope::MessageEnvelope;

const ARN_PREFIX: &str = "arn:aws:sns:local:000000000000";

/// Protocols whose subscriptions wait for the endpoint owner to confirm.
const CONFIRMED_PROTOCOLS: [&str; 5] = ["http", "https", "email", "email-json", "sms"];

/// One outbound call as seen by the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    CreateTopic {
        name: String,
    },
    DeleteTopic {
        topic_id: String,
    },
    Publish {
        topic_id: String,
        envelope: MessageEnvelope,
    },
    CreatePlatformEndpoint {
        application_id: String,
        token: String,
    },
    Subscribe {
        topic_id: String,
        protocol: String,
        endpoint: String,
    },
}

impl ProviderCall {
    fn operation(&self) -> &'static str {
        match self {
            ProviderCall::CreateTopic { .. } => "create_topic",
            ProviderCall::DeleteTopic { .. } => "delete_topic",
            ProviderCall::Publish { .. } => "publish",
            ProviderCall::CreatePlatformEndpoint { .. } => "create_platform_endpoint",
            ProviderCall::Subscribe { .. } => "subscribe",
        }
    }
}

#[derive(Default)]
pub struct MemoryProvider {
    /// topic ARN -> topic name
    topics: DashMap<String, String>,
    /// (application ARN, device token) -> endpoint ARN
    endpoints: DashMap<(String, String), String>,
    /// subscription ARN -> (topic ARN, endpoint)
    subscriptions: DashMap<String, (String, String)>,
    calls: Mutex<Vec<ProviderCall>>,
    failing: Mutex<HashSet<&'static str>>,
    sequence: AtomicU64,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a topic that exists outside this provider (seeded topics).
    pub fn adopt_topic(&self, topic_id: &str, name: &str) {
        self.topics.insert(topic_id.to_string(), name.to_string());
    }

    /// Make every subsequent call to `operation` fail until cleared.
    pub fn fail_operation(&self, operation: &'static str) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(operation);
    }

    pub fn clear_failures(&self) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Every call received so far, in arrival order.
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn has_topic(&self, topic_id: &str) -> bool {
        self.topics.contains_key(topic_id)
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    fn record(&self, call: ProviderCall) -> ProviderResult<()> {
        let operation = call.operation();
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);

        let failing = self
            .failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(operation);

        if failing {
            return Err(ProviderError::Request {
                operation,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn next_id(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl NotificationProvider for MemoryProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create_topic(&self, name: &str) -> ProviderResult<String> {
        self.record(ProviderCall::CreateTopic {
            name: name.to_string(),
        })?;

        // SNS topic creation is idempotent per name
        let arn = format!("{}:{}", ARN_PREFIX, name);
        self.topics.insert(arn.clone(), name.to_string());
        Ok(arn)
    }

    async fn delete_topic(&self, topic_id: &str) -> ProviderResult<()> {
        self.record(ProviderCall::DeleteTopic {
            topic_id: topic_id.to_string(),
        })?;

        self.topics.remove(topic_id);
        self.subscriptions.retain(|_, entry| entry.0 != topic_id);
        Ok(())
    }

    async fn publish(
        &self,
        topic_id: &str,
        envelope: &MessageEnvelope,
    ) -> ProviderResult<Option<String>> {
        self.record(ProviderCall::Publish {
            topic_id: topic_id.to_string(),
            envelope: envelope.clone(),
        })?;

        if !self.topics.contains_key(topic_id) {
            return Err(ProviderError::NotFound(topic_id.to_string()));
        }

        Ok(Some(uuid::Uuid::new_v4().to_string()))
    }

    async fn create_platform_endpoint(
        &self,
        application_id: &str,
        token: &str,
    ) -> ProviderResult<String> {
        self.record(ProviderCall::CreatePlatformEndpoint {
            application_id: application_id.to_string(),
            token: token.to_string(),
        })?;

        // SNS hands back the existing endpoint for a token already registered
        // under the same application
        let arn = self
            .endpoints
            .entry((application_id.to_string(), token.to_string()))
            .or_insert_with(|| format!("{}:endpoint/{}", application_id, self.next_id()))
            .value()
            .clone();
        Ok(arn)
    }

    async fn subscribe(
        &self,
        topic_id: &str,
        protocol: &str,
        endpoint: &str,
    ) -> ProviderResult<Option<String>> {
        self.record(ProviderCall::Subscribe {
            topic_id: topic_id.to_string(),
            protocol: protocol.to_string(),
            endpoint: endpoint.to_string(),
        })?;

        if !self.topics.contains_key(topic_id) {
            return Err(ProviderError::NotFound(topic_id.to_string()));
        }

        if CONFIRMED_PROTOCOLS.contains(&protocol) {
            return Ok(None);
        }

        let arn = format!("{}:{}", topic_id, uuid::Uuid::new_v4());
        self.subscriptions
            .insert(arn.clone(), (topic_id.to_string(), endpoint.to_string()));
        Ok(Some(arn))
    }
}
