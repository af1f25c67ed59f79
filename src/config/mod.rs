mod app_config;

pub use app_config::{
    AppConfig, DispatcherConfig, DownstreamConfig, LogFormat, LoggingConfig, ServerConfig,
};
