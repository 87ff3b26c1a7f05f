//! API layer - HTTP endpoint handlers organized by domain.

mod extract;
mod health;
mod metrics;
mod notifications;
mod routes;
mod topics;

pub use extract::ApiQuery;
pub use health::{health, root, stats};
pub use metrics::prometheus_metrics;
pub use notifications::{publish_message, register_device, subscribe_endpoint};
pub use routes::api_routes;
pub use topics::{create_topic, list_topics, remove_topic};
