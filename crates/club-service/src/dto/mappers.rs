//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use club_core::entities::{Invitation, Membership, User};

use super::responses::{InvitationResponse, MembershipResponse, UserSummary};

// ============================================================================
// Membership Mappers
// ============================================================================

impl From<&Membership> for MembershipResponse {
    fn from(membership: &Membership) -> Self {
        Self {
            id: membership.id.to_string(),
            club_id: membership.club_id.to_string(),
            user_id: membership.user_id.to_string(),
            role: membership.role,
            status: membership.status,
            joined_at: membership.joined_at,
            updated_at: membership.updated_at,
            join_message: membership.join_message.clone(),
            invited_by: membership.invited_by.as_ref().map(ToString::to_string),
            processed_by: membership.processed_by.as_ref().map(ToString::to_string),
            processed_at: membership.processed_at,
            reason: membership.reason.clone(),
        }
    }
}

impl From<Membership> for MembershipResponse {
    fn from(membership: Membership) -> Self {
        Self::from(&membership)
    }
}

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

// ============================================================================
// Invitation Mappers
// ============================================================================

impl From<&Invitation> for InvitationResponse {
    fn from(invitation: &Invitation) -> Self {
        Self {
            id: invitation.id.to_string(),
            club_id: invitation.club_id.to_string(),
            invitation_type: invitation.invitation_type(),
            email: invitation.email().map(str::to_owned),
            user_id: invitation.user_id().map(ToString::to_string),
            role: invitation.role,
            status: invitation.status,
            is_expired: invitation.is_expired(),
            invited_by: invitation.invited_by.to_string(),
            invited_at: invitation.invited_at,
            expires_at: invitation.expires_at,
            processed_at: invitation.processed_at,
            message: invitation.message.clone(),
            token: None,
        }
    }
}

impl From<Invitation> for InvitationResponse {
    fn from(invitation: Invitation) -> Self {
        Self::from(&invitation)
    }
}

impl InvitationResponse {
    /// Response for the inviter, carrying the delivery token
    pub fn with_token(invitation: &Invitation) -> Self {
        Self {
            token: invitation.token().map(str::to_owned),
            ..Self::from(invitation)
        }
    }
}
