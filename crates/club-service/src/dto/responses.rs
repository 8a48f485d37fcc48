//! Response DTOs for workflow outputs
//!
//! All response DTOs implement `Serialize` for JSON serialization.

use chrono::{DateTime, Utc};
use club_core::{ClubRole, InvitationStatus, InvitationType, MembershipStatus};
use serde::Serialize;

// ============================================================================
// Common Response Wrappers
// ============================================================================

/// One page of a cursor-paginated listing
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl<T> PageResponse<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self {
            has_more: next_cursor.is_some(),
            items,
            next_cursor,
        }
    }
}

// ============================================================================
// Membership Responses
// ============================================================================

/// Membership response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipResponse {
    pub id: String,
    pub club_id: String,
    pub user_id: String,
    pub role: ClubRole,
    pub status: MembershipStatus,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invited_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Public profile fields shown next to a membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Club member listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberWithUserResponse {
    #[serde(flatten)]
    pub membership: MembershipResponse,
    /// Absent when the user directory no longer knows the user
    pub user: Option<UserSummary>,
}

/// Role and capabilities an actor holds in a club
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveCapabilitiesResponse {
    pub club_id: String,
    pub role: Option<ClubRole>,
    pub capabilities: Vec<&'static str>,
    pub system_override: bool,
}

// ============================================================================
// Invitation Responses
// ============================================================================

/// Invitation response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvitationResponse {
    pub id: String,
    pub club_id: String,
    pub invitation_type: InvitationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub role: ClubRole,
    pub status: InvitationStatus,
    /// Time-based expiry; authoritative over a stale stored status
    pub is_expired: bool,
    pub invited_by: String,
    pub invited_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Delivery token; only returned to the inviter on creation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Result of accepting or declining an invitation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessInvitationResponse {
    pub invitation: InvitationResponse,
    /// Membership created by an acceptance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership: Option<MembershipResponse>,
}

/// Result of an expiry sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpireInvitationsResponse {
    pub expired: usize,
}
