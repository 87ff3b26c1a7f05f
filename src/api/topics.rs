//! Topic registry endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::ApiQuery;
use crate::error::{require_params, Result};
use crate::server::AppState;
use crate::topic::{Topic, TopicList};

#[derive(Debug, Deserialize)]
pub struct CreateTopicParams {
    pub name: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopicParams {
    pub topic: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TopicDeletedResponse {
    pub status: &'static str,
    pub topic: String,
}

/// GET /topics - List registered topics keyed by name
#[tracing::instrument(name = "http.list_topics", skip(state))]
pub async fn list_topics(State(state): State<AppState>) -> Json<TopicList> {
    Json(state.registry.list())
}

/// POST /create?name=..&display_name=.. - Create a topic
#[tracing::instrument(name = "http.create_topic", skip(state))]
pub async fn create_topic(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<CreateTopicParams>,
) -> Result<(StatusCode, Json<Topic>)> {
    let [name, display_name] = require_params([
        ("name", params.name.as_deref()),
        ("display_name", params.display_name.as_deref()),
    ])?;

    let topic = state.registry.create_topic(name, display_name).await?;
    Ok((StatusCode::CREATED, Json(topic)))
}

/// DELETE /remove?topic=.. - Delete a topic
#[tracing::instrument(name = "http.remove_topic", skip(state))]
pub async fn remove_topic(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TopicParams>,
) -> Result<Json<TopicDeletedResponse>> {
    let [topic] = require_params([("topic", params.topic.as_deref())])?;

    state.registry.delete_topic(topic).await?;
    Ok(Json(TopicDeletedResponse {
        status: "deleted",
        topic: topic.to_string(),
    }))
}
