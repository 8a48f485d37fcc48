//! Log subscriber setup

mod tracing_setup;

pub use tracing_setup::{init_tracing, init_tracing_for, TracingConfig, TracingError, AUDIT_TARGET};
