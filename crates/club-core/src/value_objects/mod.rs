//! Value objects - immutable types that represent domain concepts

mod capabilities;
mod ids;
mod policy;
mod role;
mod status;

pub use capabilities::{
    capabilities_for, capabilities_for_token, minimum_role_for, minimum_role_for_token,
    role_has_capability, role_token_has_capability, Capabilities, SystemCapabilities,
};
pub use ids::{ClubId, InvitationId, MembershipId, UserId};
pub use policy::{can_manage, check_role_assignment, RoleAssignmentDenial};
pub use role::{ClubRole, SystemRole};
pub use status::{InvitationStatus, MembershipStatus};
