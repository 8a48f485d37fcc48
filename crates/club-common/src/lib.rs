//! # club-common
//!
//! Shared utilities including configuration, error handling, and telemetry.

pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{
    AppConfig, AppSettings, AuthzConfig, ConfigError, DatabaseConfig, Environment,
    PaginationConfig, RedisConfig, StoreBackend, StoreConfig,
};
pub use error::{status_for_kind, AppError, AppResult, ErrorResponse};
pub use telemetry::{init_tracing, init_tracing_for, TracingConfig, TracingError, AUDIT_TARGET};
