//! Repository implementations
//!
//! Implementations of the club-core repository traits over any `ItemStore`.
//! Each write assembles its complete batch in memory and submits it once.

mod error;
mod invitation;
mod membership;
mod pagination;

pub use invitation::KvInvitationRepository;
pub use membership::KvMembershipRepository;
