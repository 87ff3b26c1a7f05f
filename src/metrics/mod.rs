//! Prometheus metrics for the gateway.
//!
//! - Topic registry size and topic operation outcomes
//! - Publish outcomes by message kind
//! - Device registrations and subscriptions
//! - Provider call latency by operation

mod helpers;

pub use helpers::{
    encode_metrics, DeviceMetrics, MessageMetrics, ProviderMetrics, SubscriptionMetrics,
    TopicMetrics,
};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
    HistogramVec, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "topic_gateway";

lazy_static! {
    // ============================================================================
    // Topic Metrics
    // ============================================================================

    /// Number of topics currently in the registry
    pub static ref TOPICS_REGISTERED: IntGauge = register_int_gauge!(
        format!("{}_topics_registered", METRIC_PREFIX),
        "Number of topics currently in the registry"
    ).unwrap();

    /// Topic create/delete operations by outcome
    pub static ref TOPIC_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_topic_operations_total", METRIC_PREFIX),
        "Topic operations by operation and outcome",
        &["operation", "outcome"]
    ).unwrap();

    // ============================================================================
    // Message Metrics
    // ============================================================================

    /// Messages accepted by the provider, by message kind
    pub static ref MESSAGES_PUBLISHED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_messages_published_total", METRIC_PREFIX),
        "Messages published to the provider",
        &["kind"]
    ).unwrap();

    /// Publish calls rejected by the provider
    pub static ref MESSAGES_FAILED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_messages_failed_total", METRIC_PREFIX),
        "Publish calls that failed at the provider"
    ).unwrap();

    // ============================================================================
    // Device & Subscription Metrics
    // ============================================================================

    pub static ref DEVICES_REGISTERED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_devices_registered_total", METRIC_PREFIX),
        "Device endpoints registered by platform",
        &["platform"]
    ).unwrap();

    pub static ref SUBSCRIPTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_subscriptions_total", METRIC_PREFIX),
        "Subscriptions created by protocol and confirmation state",
        &["protocol", "state"]
    ).unwrap();

    // ============================================================================
    // Provider Metrics
    // ============================================================================

    pub static ref PROVIDER_CALL_LATENCY: HistogramVec = register_histogram_vec!(
        format!("{}_provider_call_latency_seconds", METRIC_PREFIX),
        "Latency of calls to the notification provider",
        &["operation"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    ).unwrap();
}
