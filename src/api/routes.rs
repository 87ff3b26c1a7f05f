use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::server::{api_key_auth, AppState};

use super::health::{health, root, stats};
use super::metrics::prometheus_metrics;
use super::notifications::{publish_message, register_device, subscribe_endpoint};
use super::topics::{create_topic, list_topics, remove_topic};

pub fn api_routes(state: AppState) -> Router<AppState> {
    // Routes that change provider state require the API key when one is set
    let protected = Router::new()
        .route("/create", post(create_topic))
        .route("/remove", delete(remove_topic))
        .route("/publish", post(publish_message))
        .route("/register", get(register_device).post(register_device))
        .route("/subscribe", post(subscribe_endpoint))
        .route_layer(middleware::from_fn_with_state(state, api_key_auth));

    Router::new()
        // Health & Stats
        .route("/", get(root))
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/metrics", get(prometheus_metrics))
        // Topic registry
        .route("/topics", get(list_topics))
        .merge(protected)
}
