//! Business logic services
//!
//! Every externally exposed workflow checks authorization first, applies the
//! entity's own transition rules, then persists through the repositories.

pub mod audit;
pub mod authorization;
pub mod context;
pub mod error;
pub mod invitation;
pub mod membership;

// Re-export all services for convenience
pub use audit::TracingAuditSink;
pub use authorization::AuthorizationService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use invitation::InvitationService;
pub use membership::MembershipService;
