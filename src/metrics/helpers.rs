//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use super::{
    DEVICES_REGISTERED_TOTAL, MESSAGES_FAILED_TOTAL, MESSAGES_PUBLISHED_TOTAL,
    PROVIDER_CALL_LATENCY, SUBSCRIPTIONS_TOTAL, TOPICS_REGISTERED, TOPIC_OPERATIONS_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

pub struct TopicMetrics;

impl TopicMetrics {
    /// Record a create/delete outcome
    pub fn record(operation: &str, outcome: &str) {
        TOPIC_OPERATIONS_TOTAL
            .with_label_values(&[operation, outcome])
            .inc();
    }

    pub fn set_registered(count: usize) {
        TOPICS_REGISTERED.set(count as i64);
    }
}

pub struct MessageMetrics;

impl MessageMetrics {
    /// Record a message accepted by the provider
    pub fn record_published(kind: &str) {
        MESSAGES_PUBLISHED_TOTAL.with_label_values(&[kind]).inc();
    }

    pub fn record_failed() {
        MESSAGES_FAILED_TOTAL.inc();
    }
}

pub struct DeviceMetrics;

impl DeviceMetrics {
    pub fn record_registered(platform: &str) {
        DEVICES_REGISTERED_TOTAL.with_label_values(&[platform]).inc();
    }
}

pub struct SubscriptionMetrics;

impl SubscriptionMetrics {
    /// Record a subscription; pending ones await endpoint confirmation
    pub fn record(protocol: &str, confirmed: bool) {
        let state = if confirmed { "confirmed" } else { "pending" };
        SUBSCRIPTIONS_TOTAL.with_label_values(&[protocol, state]).inc();
    }
}

pub struct ProviderMetrics;

impl ProviderMetrics {
    /// Record the latency of one provider call
    pub fn observe(operation: &str, elapsed: Duration) {
        PROVIDER_CALL_LATENCY
            .with_label_values(&[operation])
            .observe(elapsed.as_secs_f64());
    }
}
