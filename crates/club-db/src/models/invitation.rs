//! Invitation record models

use chrono::{DateTime, Utc};
use club_core::{ClubId, ClubRole, InvitationId, InvitationStatus, InvitationType, UserId};
use serde::{Deserialize, Serialize};

/// Stored representation of an invitation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationRecord {
    pub entity_type: String,
    pub id: InvitationId,
    pub club_id: ClubId,
    pub invitation_type: InvitationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub role: ClubRole,
    pub status: InvitationStatus,
    pub invited_by: UserId,
    pub invited_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Marker held while an invitee has a pending invitation to a club
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationGuardRecord {
    pub entity_type: String,
    pub invitation_id: InvitationId,
    pub created_at: DateTime<Utc>,
}
