//! Partition / sort key layout
//!
//! | Item                     | pk                         | sk                           |
//! |--------------------------|----------------------------|------------------------------|
//! | membership (canonical)   | `CLUB#{club}`              | `MEMBER#{user}`              |
//! | membership by user       | `USER#{user}`              | `MEMBERSHIP#{club}`          |
//! | membership by club role  | `CLUB#{club}#ROLE#{role}`  | `MEMBER#{user}`              |
//! | invitation (canonical)   | `INVITATION#{id}`          | `METADATA`                   |
//! | invitation by club       | `CLUB#{club}`              | `INVITATION#{invited_at}#{id}` |
//! | invitation by user       | `USER#{user}`              | `INVITATION#{invited_at}#{id}` |
//! | invitation by email      | `EMAIL#{email}`            | `INVITATION#{invited_at}#{id}` |
//! | invitation by token      | `TOKEN#{token}`            | `INVITATION`                 |
//! | pending invitation guard | `CLUB#{club}`              | `PENDING_INVITE#{invitee}`   |
//!
//! Timestamps in sort keys are fixed-width RFC 3339 (microseconds, `Z`), so
//! lexicographic order is chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use club_core::{ClubId, ClubRole, InvitationId, InviteeKey, UserId};

use crate::store::ItemKey;

pub const MEMBER_PREFIX: &str = "MEMBER#";
pub const MEMBERSHIP_PREFIX: &str = "MEMBERSHIP#";
pub const INVITATION_PREFIX: &str = "INVITATION#";
pub const PENDING_INVITE_PREFIX: &str = "PENDING_INVITE#";
pub const METADATA_SK: &str = "METADATA";
pub const TOKEN_SK: &str = "INVITATION";

pub fn club_pk(club_id: &ClubId) -> String {
    format!("CLUB#{club_id}")
}

pub fn user_pk(user_id: &UserId) -> String {
    format!("USER#{user_id}")
}

pub fn email_pk(email: &str) -> String {
    format!("EMAIL#{email}")
}

pub fn club_role_pk(club_id: &ClubId, role: ClubRole) -> String {
    format!("CLUB#{club_id}#ROLE#{role}")
}

// ============================================================================
// Membership keys
// ============================================================================

pub fn membership_key(club_id: &ClubId, user_id: &UserId) -> ItemKey {
    ItemKey::new(club_pk(club_id), format!("{MEMBER_PREFIX}{user_id}"))
}

pub fn membership_user_index_key(club_id: &ClubId, user_id: &UserId) -> ItemKey {
    ItemKey::new(user_pk(user_id), format!("{MEMBERSHIP_PREFIX}{club_id}"))
}

pub fn membership_role_index_key(club_id: &ClubId, role: ClubRole, user_id: &UserId) -> ItemKey {
    ItemKey::new(club_role_pk(club_id, role), format!("{MEMBER_PREFIX}{user_id}"))
}

// ============================================================================
// Invitation keys
// ============================================================================

pub fn invitation_key(id: &InvitationId) -> ItemKey {
    ItemKey::new(format!("INVITATION#{id}"), METADATA_SK)
}

/// Sort key shared by the club, user and email invitation indexes
pub fn invitation_sk(invited_at: DateTime<Utc>, id: &InvitationId) -> String {
    format!(
        "{INVITATION_PREFIX}{}#{id}",
        invited_at.to_rfc3339_opts(SecondsFormat::Micros, true)
    )
}

pub fn invitation_club_index_key(
    club_id: &ClubId,
    invited_at: DateTime<Utc>,
    id: &InvitationId,
) -> ItemKey {
    ItemKey::new(club_pk(club_id), invitation_sk(invited_at, id))
}

pub fn invitation_user_index_key(
    user_id: &UserId,
    invited_at: DateTime<Utc>,
    id: &InvitationId,
) -> ItemKey {
    ItemKey::new(user_pk(user_id), invitation_sk(invited_at, id))
}

pub fn invitation_email_index_key(
    email: &str,
    invited_at: DateTime<Utc>,
    id: &InvitationId,
) -> ItemKey {
    ItemKey::new(email_pk(email), invitation_sk(invited_at, id))
}

pub fn invitation_token_key(token: &str) -> ItemKey {
    ItemKey::new(format!("TOKEN#{token}"), TOKEN_SK)
}

pub fn pending_invitation_guard_key(club_id: &ClubId, invitee: &InviteeKey) -> ItemKey {
    let target = match invitee {
        InviteeKey::Email(email) => format!("EMAIL#{email}"),
        InviteeKey::User(user_id) => format!("USER#{user_id}"),
    };
    ItemKey::new(club_pk(club_id), format!("{PENDING_INVITE_PREFIX}{target}"))
}
