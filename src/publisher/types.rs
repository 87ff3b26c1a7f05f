use std::fmt;

use serde::Serialize;

/// Device platforms accepted by device registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevicePlatform {
    Ios,
    Android,
}

impl DevicePlatform {
    /// Parse the `type` parameter. Matching is exact: `"ios"` or `"android"`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ios" => Some(DevicePlatform::Ios),
            "android" => Some(DevicePlatform::Android),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DevicePlatform::Ios => "ios",
            DevicePlatform::Android => "android",
        }
    }
}

impl fmt::Display for DevicePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful publish
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl DeliveryStatus {
    pub fn published(message_id: Option<String>) -> Self {
        Self {
            status: "published",
            message_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistration {
    pub endpoint_arn: String,
}

/// Subscription result. No ARN is issued while the endpoint owner still has
/// to confirm.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_arn: Option<String>,
}

/// Snapshot of publisher statistics
#[derive(Debug, Clone, Serialize)]
pub struct PublisherStatsSnapshot {
    pub published: u64,
    pub publish_failed: u64,
    pub devices_registered: u64,
    pub subscriptions: u64,
}
