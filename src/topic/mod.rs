//! Topic registry.
//!
//! Maps caller-chosen topic names to the provider topics backing them. The
//! registry is the gateway's only state; it lives in memory and is rebuilt
//! from configured seed topics on startup.

mod registry;
mod types;

pub use registry::TopicRegistry;
pub use types::{Topic, TopicError, TopicList, TopicResult};
