//! Data transfer objects for workflow inputs and outputs
//!
//! This module provides:
//! - Request DTOs with validation for workflow inputs
//! - Response DTOs for serializing workflow outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    InviteByEmailRequest, InviteUserRequest, JoinClubRequest, JoinRequestAction,
    ListInvitationsQuery, ListMembersQuery, MemberActionRequest, ProcessInvitationRequest,
    ProcessJoinRequest, UpdateMemberRoleRequest,
};

pub use responses::{
    EffectiveCapabilitiesResponse, ExpireInvitationsResponse, InvitationResponse,
    MemberWithUserResponse, MembershipResponse, PageResponse, ProcessInvitationResponse,
    UserSummary,
};
