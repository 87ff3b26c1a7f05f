// Core services
pub mod envelope;
pub mod provider;
pub mod publisher;
pub mod topic;

// Infrastructure
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;

// Application layer
pub mod api;
pub mod server;
