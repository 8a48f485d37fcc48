//! # club-service
//!
//! Application layer: the authorization engine, membership and invitation
//! workflows, audit emission, and request/response DTOs.

pub mod bootstrap;
pub mod dto;
pub mod services;

pub use bootstrap::build_context;
pub use services::{
    AuthorizationService, InvitationService, MembershipService, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, TracingAuditSink,
};
