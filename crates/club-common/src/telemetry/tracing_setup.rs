//! Tracing subscriber setup
//!
//! Workflow audit records are emitted on their own target so deployments can
//! route or silence them independently of application logs.

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::Environment;

/// Target used by the workflow audit sink
pub const AUDIT_TARGET: &str = "club_audit";

/// Subscriber options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Default level for application logs
    pub level: Level,
    /// Level for audit records; `None` silences them
    pub audit_level: Option<Level>,
    /// Structured JSON lines instead of human-readable output
    pub json: bool,
    /// Log span open/close, useful for timing repository calls
    pub span_events: bool,
    pub file_line: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::Development)
    }
}

impl TracingConfig {
    /// Preset for an application environment
    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self {
                level: Level::DEBUG,
                audit_level: Some(Level::INFO),
                json: false,
                span_events: true,
                file_line: true,
            },
            Environment::Staging => Self {
                level: Level::DEBUG,
                audit_level: Some(Level::INFO),
                json: true,
                span_events: false,
                file_line: false,
            },
            Environment::Production => Self {
                level: Level::INFO,
                audit_level: Some(Level::INFO),
                json: true,
                span_events: false,
                file_line: false,
            },
        }
    }

    /// Filter directives used when `RUST_LOG` is unset
    pub fn directives(&self) -> String {
        let audit = self
            .audit_level
            .map_or_else(|| "off".to_string(), |level| level.to_string().to_lowercase());
        format!(
            "{},{AUDIT_TARGET}={audit}",
            self.level.to_string().to_lowercase()
        )
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over the configured directives.
pub fn init_tracing(config: &TracingConfig) -> Result<(), TracingError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.directives()))
        .map_err(|e| TracingError::InvalidFilter(e.to_string()))?;

    let json_layer = config.json.then(|| {
        fmt::layer()
            .json()
            .with_file(config.file_line)
            .with_line_number(config.file_line)
            .with_span_events(config.span_events())
    });
    let pretty_layer = (!config.json).then(|| {
        fmt::layer()
            .with_file(config.file_line)
            .with_line_number(config.file_line)
            .with_span_events(config.span_events())
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .map_err(|_| TracingError::AlreadyInitialized)
}

/// Install the subscriber preset for `env`
pub fn init_tracing_for(env: Environment) -> Result<(), TracingError> {
    init_tracing(&TracingConfig::for_environment(env))
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,

    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
}
