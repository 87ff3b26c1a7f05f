//! In-memory topic registry backed by the notification provider

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::config::SeedTopic;
use crate::metrics::TopicMetrics;
use crate::provider::NotificationProvider;

use super::types::{Topic, TopicError, TopicList, TopicResult};

pub struct TopicRegistry {
    topics: DashMap<String, Topic>,
    provider: Arc<dyn NotificationProvider>,
}

impl TopicRegistry {
    pub fn new(provider: Arc<dyn NotificationProvider>) -> Self {
        Self {
            topics: DashMap::new(),
            provider,
        }
    }

    /// Adopt topics that already exist at the provider.
    ///
    /// No provider call is made. Entries without a name or ARN are skipped.
    /// Returns the number of topics added.
    pub fn seed(&self, seeds: &[SeedTopic]) -> usize {
        let mut added = 0;
        for seed in seeds {
            if seed.name.is_empty() || seed.arn.is_empty() {
                tracing::warn!(name = %seed.name, "Skipping seed topic without name or ARN");
                continue;
            }

            let display_name = if seed.display_name.is_empty() {
                seed.name.clone()
            } else {
                seed.display_name.clone()
            };

            match self.topics.entry(seed.name.clone()) {
                Entry::Occupied(_) => {
                    tracing::warn!(name = %seed.name, "Duplicate seed topic ignored");
                }
                Entry::Vacant(slot) => {
                    slot.insert(Topic::new(&seed.name, &seed.arn, display_name));
                    added += 1;
                }
            }
        }

        TopicMetrics::set_registered(self.topics.len());
        added
    }

    /// Create a provider topic and register it under `name`.
    ///
    /// An existing name is rejected rather than overwritten.
    #[tracing::instrument(name = "registry.create_topic", skip(self))]
    pub async fn create_topic(&self, name: &str, display_name: &str) -> TopicResult<Topic> {
        if self.topics.contains_key(name) {
            TopicMetrics::record("create", "duplicate");
            return Err(TopicError::AlreadyExists(name.to_string()));
        }

        let topic_arn = match self.provider.create_topic(name).await {
            Ok(arn) => arn,
            Err(e) => {
                TopicMetrics::record("create", "provider_error");
                return Err(e.into());
            }
        };

        // A concurrent create may have won while the provider call was in flight
        let topic = match self.topics.entry(name.to_string()) {
            Entry::Occupied(_) => {
                TopicMetrics::record("create", "duplicate");
                return Err(TopicError::AlreadyExists(name.to_string()));
            }
            Entry::Vacant(slot) => slot
                .insert(Topic::new(name, topic_arn, display_name))
                .value()
                .clone(),
        };

        TopicMetrics::record("create", "ok");
        TopicMetrics::set_registered(self.topics.len());
        tracing::info!(topic = %name, topic_arn = %topic.topic_arn, "Topic created");

        Ok(topic)
    }

    /// Delete the provider topic, then forget it locally.
    ///
    /// The local entry survives a failed provider call.
    #[tracing::instrument(name = "registry.delete_topic", skip(self))]
    pub async fn delete_topic(&self, name: &str) -> TopicResult<()> {
        let topic = match self.lookup(name) {
            Ok(topic) => topic,
            Err(e) => {
                TopicMetrics::record("delete", "not_found");
                return Err(e);
            }
        };

        if let Err(e) = self.provider.delete_topic(&topic.topic_arn).await {
            TopicMetrics::record("delete", "provider_error");
            return Err(e.into());
        }

        self.topics.remove(name);

        TopicMetrics::record("delete", "ok");
        TopicMetrics::set_registered(self.topics.len());
        tracing::info!(topic = %name, topic_arn = %topic.topic_arn, "Topic deleted");

        Ok(())
    }

    pub fn lookup(&self, name: &str) -> TopicResult<Topic> {
        self.topics
            .get(name)
            .map(|t| t.value().clone())
            .ok_or_else(|| TopicError::NotFound(name.to_string()))
    }

    pub fn list(&self) -> TopicList {
        self.topics
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.topics.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}
