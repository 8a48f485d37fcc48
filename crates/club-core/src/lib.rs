//! # club-core
//!
//! Domain layer for club membership: identifiers, the role hierarchy and capability
//! table, the Membership and Invitation state machines, domain errors, audit events,
//! and the repository / collaborator traits the infrastructure crates implement.
//! This crate has zero dependencies on infrastructure (database, cache, transport).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    generate_invitation_token, ActorContext, Club, Invitation, InvitationAction, InvitationInput,
    InvitationTarget, InvitationType, InviteeKey, JoinPolicy, Membership, NewMembership, User,
};
pub use error::{DomainError, ErrorKind};
pub use events::{AuditEvent, AuditOutcome};
pub use traits::{
    AuditSink, ClubDirectory, InvitationFilter, InvitationRepository, MembershipFilter,
    MembershipRepository, Page, RepoResult, UserDirectory,
};
pub use value_objects::{
    Capabilities, ClubId, ClubRole, InvitationId, InvitationStatus, MembershipId,
    MembershipStatus, SystemCapabilities, SystemRole, UserId,
};
