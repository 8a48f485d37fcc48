//! Persisted record models
//!
//! Records are stored as the JSON payload of every item (canonical and
//! index) belonging to an aggregate. Top-level `status` and `role` fields
//! are what write conditions compare against.

mod invitation;
mod membership;

pub use invitation::{InvitationGuardRecord, InvitationRecord};
pub use membership::MembershipRecord;

/// Record type tag stored alongside every payload
pub const MEMBERSHIP_ENTITY: &str = "membership";
pub const INVITATION_ENTITY: &str = "invitation";
pub const INVITATION_GUARD_ENTITY: &str = "pending_invitation";
