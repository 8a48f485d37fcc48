//! Membership entity <-> record mapper

use club_core::entities::Membership;

use crate::models::{MembershipRecord, MEMBERSHIP_ENTITY};

impl From<&Membership> for MembershipRecord {
    fn from(m: &Membership) -> Self {
        Self {
            entity_type: MEMBERSHIP_ENTITY.to_string(),
            id: m.id.clone(),
            club_id: m.club_id.clone(),
            user_id: m.user_id.clone(),
            role: m.role,
            status: m.status,
            joined_at: m.joined_at,
            updated_at: m.updated_at,
            join_message: m.join_message.clone(),
            invited_by: m.invited_by.clone(),
            processed_by: m.processed_by.clone(),
            processed_at: m.processed_at,
            reason: m.reason.clone(),
        }
    }
}

impl From<MembershipRecord> for Membership {
    fn from(record: MembershipRecord) -> Self {
        Membership {
            id: record.id,
            club_id: record.club_id,
            user_id: record.user_id,
            role: record.role,
            status: record.status,
            joined_at: record.joined_at,
            updated_at: record.updated_at,
            join_message: record.join_message,
            invited_by: record.invited_by,
            processed_by: record.processed_by,
            processed_at: record.processed_at,
            reason: record.reason,
        }
    }
}
