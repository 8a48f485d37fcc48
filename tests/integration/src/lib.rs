//! Integration test utilities for the club membership workflows
//!
//! This crate provides an in-memory harness with fake club and user
//! directories and a recording audit sink.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
