//! Ports implemented by the infrastructure crates

mod audit;
mod directories;
mod repositories;

pub use audit::AuditSink;
pub use directories::{ClubDirectory, UserDirectory};
pub use repositories::{
    InvitationFilter, InvitationRepository, MembershipFilter, MembershipRepository, Page,
    RepoResult,
};
