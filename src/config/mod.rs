mod settings;

pub use settings::{
    ApiConfig, LogConfig, LogFormat, OtelConfig, PlatformConfig, ProviderBackend, ProviderConfig,
    SeedTopic, ServerConfig, Settings,
};
