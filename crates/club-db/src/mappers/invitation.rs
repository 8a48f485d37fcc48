//! Invitation entity <-> record mapper

use club_core::entities::{Invitation, InvitationTarget};
use club_core::{DomainError, InvitationType};

use crate::models::{InvitationRecord, INVITATION_ENTITY};

impl From<&Invitation> for InvitationRecord {
    fn from(inv: &Invitation) -> Self {
        Self {
            entity_type: INVITATION_ENTITY.to_string(),
            id: inv.id.clone(),
            club_id: inv.club_id.clone(),
            invitation_type: inv.invitation_type(),
            email: inv.email().map(str::to_owned),
            token: inv.token().map(str::to_owned),
            user_id: inv.user_id().cloned(),
            role: inv.role,
            status: inv.status,
            invited_by: inv.invited_by.clone(),
            invited_at: inv.invited_at,
            expires_at: inv.expires_at,
            processed_at: inv.processed_at,
            message: inv.message.clone(),
        }
    }
}

impl TryFrom<InvitationRecord> for Invitation {
    type Error = DomainError;

    fn try_from(record: InvitationRecord) -> Result<Self, Self::Error> {
        let target = match record.invitation_type {
            InvitationType::Email => InvitationTarget::Email {
                email: record.email.ok_or_else(|| corrupt(&record.id, "email"))?,
                token: record.token.ok_or_else(|| corrupt(&record.id, "token"))?,
                user_id: record.user_id,
            },
            InvitationType::User => InvitationTarget::User {
                user_id: record.user_id.ok_or_else(|| corrupt(&record.id, "user_id"))?,
            },
        };

        Ok(Invitation {
            id: record.id,
            club_id: record.club_id,
            target,
            role: record.role,
            status: record.status,
            invited_by: record.invited_by,
            invited_at: record.invited_at,
            expires_at: record.expires_at,
            processed_at: record.processed_at,
            message: record.message,
        })
    }
}

fn corrupt(id: &club_core::InvitationId, field: &str) -> DomainError {
    DomainError::Storage(format!("invitation {id} record is missing {field}"))
}
