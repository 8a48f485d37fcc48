//! Membership entity - one user's standing in one club
//!
//! Transitions are pure: every operation returns a new `Membership` and leaves
//! the receiver untouched.

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::{ClubId, ClubRole, MembershipId, MembershipStatus, UserId};

/// Maximum characters in a join message
pub const MAX_JOIN_MESSAGE_LEN: usize = 500;

/// Maximum characters in a processing reason
pub const MAX_REASON_LEN: usize = 500;

/// Input for creating a membership
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMembership {
    pub club_id: ClubId,
    pub user_id: UserId,
    pub role: ClubRole,
    pub status: MembershipStatus,
    pub join_message: Option<String>,
    pub invited_by: Option<UserId>,
}

impl NewMembership {
    /// A pending member-level join request
    pub fn new(club_id: impl Into<ClubId>, user_id: impl Into<UserId>) -> Self {
        Self {
            club_id: club_id.into(),
            user_id: user_id.into(),
            role: ClubRole::Member,
            status: MembershipStatus::Pending,
            join_message: None,
            invited_by: None,
        }
    }

    pub fn with_role(mut self, role: ClubRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_status(mut self, status: MembershipStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_join_message(mut self, message: Option<String>) -> Self {
        self.join_message = message;
        self
    }

    pub fn with_invited_by(mut self, invited_by: Option<UserId>) -> Self {
        self.invited_by = invited_by;
        self
    }
}

/// Membership entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub id: MembershipId,
    pub club_id: ClubId,
    pub user_id: UserId,
    pub role: ClubRole,
    pub status: MembershipStatus,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub join_message: Option<String>,
    pub invited_by: Option<UserId>,
    pub processed_by: Option<UserId>,
    pub processed_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

impl Membership {
    /// Create a new membership from validated input
    pub fn create(input: NewMembership) -> Result<Self, DomainError> {
        if input.club_id.is_blank() {
            return Err(DomainError::validation("club id is required"));
        }
        if input.user_id.is_blank() {
            return Err(DomainError::validation("user id is required"));
        }
        if input.invited_by.as_ref().is_some_and(UserId::is_blank) {
            return Err(DomainError::validation("inviter id must not be blank"));
        }
        let join_message = normalize_text(input.join_message);
        check_len("join message", join_message.as_deref(), MAX_JOIN_MESSAGE_LEN)?;

        let now = Utc::now();
        Ok(Self {
            id: MembershipId::generate(),
            club_id: input.club_id,
            user_id: input.user_id,
            role: input.role,
            status: input.status,
            joined_at: now,
            updated_at: now,
            join_message,
            invited_by: input.invited_by,
            processed_by: None,
            processed_at: None,
            reason: None,
        })
    }

    /// Move to `target`, recording who processed the change and why.
    ///
    /// Returns an unchanged copy when `target` equals the current status.
    pub fn change_status(
        &self,
        target: MembershipStatus,
        processed_by: Option<&UserId>,
        reason: Option<&str>,
    ) -> Result<Self, DomainError> {
        if target == self.status {
            return Ok(self.clone());
        }
        if !self.status.can_transition_to(target) {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status.as_str(),
                to: target.as_str(),
            });
        }
        if self.is_owner() && matches!(target, MembershipStatus::Suspended | MembershipStatus::Removed)
        {
            return Err(DomainError::validation(format!(
                "club owner cannot be {}; transfer ownership first",
                target
            )));
        }
        let reason = normalize_text(reason.map(str::to_owned));
        check_len("reason", reason.as_deref(), MAX_REASON_LEN)?;

        let now = Utc::now();
        let mut next = self.clone();
        next.status = target;
        next.updated_at = now;
        next.processed_by = processed_by.cloned();
        next.processed_at = Some(now);
        next.reason = reason;
        Ok(next)
    }

    /// Change the member's role.
    ///
    /// Owners are immutable here and owner is never a reachable target.
    pub fn update_role(
        &self,
        new_role: ClubRole,
        updated_by: &UserId,
        reason: Option<&str>,
    ) -> Result<Self, DomainError> {
        if self.is_owner() {
            return Err(DomainError::validation(
                "owner role cannot be changed; transfer ownership first",
            ));
        }
        if !self.role.can_transition_to(new_role) {
            return Err(DomainError::InvalidRoleTransition {
                from: self.role,
                to: new_role,
            });
        }
        let reason = normalize_text(reason.map(str::to_owned));
        check_len("reason", reason.as_deref(), MAX_REASON_LEN)?;

        let now = Utc::now();
        let mut next = self.clone();
        next.role = new_role;
        next.updated_at = now;
        next.processed_by = Some(updated_by.clone());
        next.processed_at = Some(now);
        next.reason = reason;
        Ok(next)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == MembershipStatus::Pending
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.status == MembershipStatus::Removed
    }

    #[inline]
    pub fn is_owner(&self) -> bool {
        self.role == ClubRole::Owner
    }

    #[inline]
    pub fn is_admin_or_owner(&self) -> bool {
        self.role.is_admin_or_owner()
    }

    /// Owners cannot be removed
    #[inline]
    pub fn can_be_removed(&self) -> bool {
        !self.is_owner()
    }

    /// Only active non-owners may leave
    #[inline]
    pub fn can_leave(&self) -> bool {
        !self.is_owner() && self.is_active()
    }
}

fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn check_len(field: &'static str, value: Option<&str>, max: usize) -> Result<(), DomainError> {
    match value {
        Some(v) if v.chars().count() > max => Err(DomainError::TooLong { field, max }),
        _ => Ok(()),
    }
}
