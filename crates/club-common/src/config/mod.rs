//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, AuthzConfig, ConfigError, DatabaseConfig, Environment,
    PaginationConfig, RedisConfig, StoreBackend, StoreConfig,
};
