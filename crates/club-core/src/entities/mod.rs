//! Domain entities - core business objects

mod actor;
mod club;
mod invitation;
mod membership;
mod user;

pub use actor::ActorContext;
pub use club::{Club, JoinPolicy};
pub use invitation::{
    generate_invitation_token, Invitation, InvitationAction, InvitationInput, InvitationTarget,
    InvitationType, InviteeKey, DEFAULT_EXPIRY_DAYS, INVITATION_TOKEN_LEN, MAX_EXPIRY_DAYS,
    MAX_INVITATION_MESSAGE_LEN,
};
pub use membership::{Membership, NewMembership, MAX_JOIN_MESSAGE_LEN, MAX_REASON_LEN};
pub use user::User;
