use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Debug, Error)]
pub enum TopicError {
    #[error("Topic not found: {0}")]
    NotFound(String),

    #[error("Topic already exists: {0}")]
    AlreadyExists(String),

    #[error("Provider call failed: {0}")]
    Provider(#[from] ProviderError),
}

pub type TopicResult<T> = Result<T, TopicError>;

/// A registered topic
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    /// Caller-chosen unique name
    pub name: String,

    /// Provider topic identifier (ARN), never empty
    pub topic_arn: String,

    pub display_name: String,

    pub created_at: DateTime<Utc>,
}

impl Topic {
    pub fn new(
        name: impl Into<String>,
        topic_arn: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            topic_arn: topic_arn.into(),
            display_name: display_name.into(),
            created_at: Utc::now(),
        }
    }
}

/// Snapshot of every registered topic keyed by name
pub type TopicList = HashMap<String, Topic>;
