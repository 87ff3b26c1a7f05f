use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::provider::{create_provider, NotificationProvider};
use crate::publisher::NotificationPublisher;
use crate::topic::TopicRegistry;

/// Shared handler state. One instance per process, built at startup.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub provider: Arc<dyn NotificationProvider>,
    pub registry: Arc<TopicRegistry>,
    pub publisher: Arc<NotificationPublisher>,
    pub start_time: Instant,
}

impl AppState {
    /// Build state with the provider selected by `settings.provider`.
    pub async fn new(settings: Settings) -> Self {
        let provider = create_provider(&settings.provider, &settings.topics).await;
        Self::with_provider(settings, provider)
    }

    /// Build state around an existing provider and load seed topics.
    pub fn with_provider(settings: Settings, provider: Arc<dyn NotificationProvider>) -> Self {
        let registry = Arc::new(TopicRegistry::new(provider.clone()));
        let seeded = registry.seed(&settings.topics);
        if seeded > 0 {
            tracing::info!(count = seeded, "Seed topics loaded");
        }

        let publisher = Arc::new(NotificationPublisher::new(
            registry.clone(),
            provider.clone(),
            settings.platforms.clone(),
        ));

        Self {
            settings: Arc::new(settings),
            provider,
            registry,
            publisher,
            start_time: Instant::now(),
        }
    }
}
