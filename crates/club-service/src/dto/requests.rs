//! Request DTOs for workflow operations
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use club_core::{ClubRole, InvitationAction, InvitationStatus, MembershipStatus};
use serde::{Deserialize, Serialize};
use validator::Validate;

// ============================================================================
// Membership Requests
// ============================================================================

/// Request to join a club
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct JoinClubRequest {
    #[validate(length(max = 500, message = "Join message must be at most 500 characters"))]
    pub message: Option<String>,
}

impl JoinClubRequest {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

/// Decision on a pending join request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinRequestAction {
    Approve,
    Reject,
}

/// Approve or reject a join request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProcessJoinRequest {
    pub action: JoinRequestAction,

    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

impl ProcessJoinRequest {
    pub fn approve() -> Self {
        Self {
            action: JoinRequestAction::Approve,
            reason: None,
        }
    }

    pub fn reject(reason: Option<String>) -> Self {
        Self {
            action: JoinRequestAction::Reject,
            reason,
        }
    }
}

/// Change a member's role
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateMemberRoleRequest {
    pub role: ClubRole,

    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

impl UpdateMemberRoleRequest {
    pub fn new(role: ClubRole) -> Self {
        Self { role, reason: None }
    }
}

/// Remove, suspend or reinstate a member
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MemberActionRequest {
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

impl MemberActionRequest {
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }
}

/// Club member listing parameters
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListMembersQuery {
    pub role: Option<ClubRole>,
    pub status: Option<MembershipStatus>,
    pub cursor: Option<String>,

    #[validate(range(min = 1, max = 100, message = "Limit must be 1-100"))]
    pub limit: Option<usize>,
}

// ============================================================================
// Invitation Requests
// ============================================================================

fn default_invited_role() -> ClubRole {
    ClubRole::Member
}

/// Invite an existing user by id
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InviteUserRequest {
    #[validate(length(min = 1, max = 128, message = "User id must be 1-128 characters"))]
    pub user_id: String,

    #[serde(default = "default_invited_role")]
    pub role: ClubRole,

    #[validate(length(max = 500, message = "Message must be at most 500 characters"))]
    pub message: Option<String>,

    #[validate(range(min = 1, max = 30, message = "Expiry must be 1-30 days"))]
    pub expires_in_days: Option<i64>,
}

impl InviteUserRequest {
    pub fn new(user_id: impl Into<String>, role: ClubRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            message: None,
            expires_in_days: None,
        }
    }
}

/// Invite someone by email address
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InviteByEmailRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default = "default_invited_role")]
    pub role: ClubRole,

    #[validate(length(max = 500, message = "Message must be at most 500 characters"))]
    pub message: Option<String>,

    #[validate(range(min = 1, max = 30, message = "Expiry must be 1-30 days"))]
    pub expires_in_days: Option<i64>,
}

impl InviteByEmailRequest {
    pub fn new(email: impl Into<String>, role: ClubRole) -> Self {
        Self {
            email: email.into(),
            role,
            message: None,
            expires_in_days: None,
        }
    }
}

/// Accept or decline an invitation
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct ProcessInvitationRequest {
    pub action: InvitationAction,
}

impl ProcessInvitationRequest {
    pub fn accept() -> Self {
        Self {
            action: InvitationAction::Accept,
        }
    }

    pub fn decline() -> Self {
        Self {
            action: InvitationAction::Decline,
        }
    }
}

/// Club invitation listing parameters
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListInvitationsQuery {
    pub status: Option<InvitationStatus>,
    pub cursor: Option<String>,

    #[validate(range(min = 1, max = 100, message = "Limit must be 1-100"))]
    pub limit: Option<usize>,
}
