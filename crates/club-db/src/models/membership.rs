//! Membership record model

use chrono::{DateTime, Utc};
use club_core::{ClubId, ClubRole, MembershipId, MembershipStatus, UserId};
use serde::{Deserialize, Serialize};

/// Stored representation of a membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub entity_type: String,
    pub id: MembershipId,
    pub club_id: ClubId,
    pub user_id: UserId,
    pub role: ClubRole,
    pub status: MembershipStatus,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invited_by: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_by: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
