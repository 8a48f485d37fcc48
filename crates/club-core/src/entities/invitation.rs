//! Invitation entity - an open offer to join a club
//!
//! An invitation is addressed either to an email address (and carries a
//! delivery token) or to a known user id. Expiry is evaluated against the
//! clock: a pending invitation past `expires_at` is not actionable even before
//! its stored status becomes `expired`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::ValidateEmail;

use crate::error::DomainError;
use crate::value_objects::{ClubId, ClubRole, InvitationId, InvitationStatus, UserId};

/// Default validity window in days
pub const DEFAULT_EXPIRY_DAYS: i64 = 7;

/// Longest validity window a caller may request
pub const MAX_EXPIRY_DAYS: i64 = 30;

/// Maximum characters in an invitation message
pub const MAX_INVITATION_MESSAGE_LEN: usize = 500;

/// Length of an email delivery token
pub const INVITATION_TOKEN_LEN: usize = 32;

/// Delivery channel of an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationType {
    Email,
    User,
}

impl InvitationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::User => "user",
        }
    }
}

impl fmt::Display for InvitationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who an invitation is addressed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvitationTarget {
    /// Email invitation; `user_id` is attached once a user accepts it
    Email {
        email: String,
        token: String,
        user_id: Option<UserId>,
    },
    User { user_id: UserId },
}

impl InvitationTarget {
    pub fn invitation_type(&self) -> InvitationType {
        match self {
            Self::Email { .. } => InvitationType::Email,
            Self::User { .. } => InvitationType::User,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Email { email, .. } => Some(email),
            Self::User { .. } => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Email { token, .. } => Some(token),
            Self::User { .. } => None,
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Email { user_id, .. } => user_id.as_ref(),
            Self::User { user_id } => Some(user_id),
        }
    }

    /// Identity used for duplicate-invitation detection
    pub fn invitee_key(&self) -> InviteeKey {
        match self {
            Self::Email { email, .. } => InviteeKey::email(email),
            Self::User { user_id } => InviteeKey::User(user_id.clone()),
        }
    }
}

/// Normalized invitee identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InviteeKey {
    /// Lowercased, trimmed email address
    Email(String),
    User(UserId),
}

impl InviteeKey {
    pub fn email(email: &str) -> Self {
        Self::Email(normalize_email(email))
    }
}

impl fmt::Display for InviteeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(email) => write!(f, "{email}"),
            Self::User(user_id) => write!(f, "user {user_id}"),
        }
    }
}

/// Input for creating an invitation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationInput {
    pub invitation_type: InvitationType,
    pub email: Option<String>,
    pub user_id: Option<UserId>,
    pub role: ClubRole,
    pub message: Option<String>,
    pub expires_in_days: Option<i64>,
}

impl InvitationInput {
    pub fn for_email(email: impl Into<String>, role: ClubRole) -> Self {
        Self {
            invitation_type: InvitationType::Email,
            email: Some(email.into()),
            user_id: None,
            role,
            message: None,
            expires_in_days: None,
        }
    }

    pub fn for_user(user_id: impl Into<UserId>, role: ClubRole) -> Self {
        Self {
            invitation_type: InvitationType::User,
            email: None,
            user_id: Some(user_id.into()),
            role,
            message: None,
            expires_in_days: None,
        }
    }

    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    pub fn with_expires_in_days(mut self, days: Option<i64>) -> Self {
        self.expires_in_days = days;
        self
    }
}

/// Recipient's response to an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationAction {
    Accept,
    Decline,
}

impl InvitationAction {
    fn target_status(self) -> InvitationStatus {
        match self {
            Self::Accept => InvitationStatus::Accepted,
            Self::Decline => InvitationStatus::Declined,
        }
    }
}

/// Invitation entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    pub id: InvitationId,
    pub club_id: ClubId,
    pub target: InvitationTarget,
    pub role: ClubRole,
    pub status: InvitationStatus,
    pub invited_by: UserId,
    pub invited_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

impl Invitation {
    /// Create a pending invitation issued now
    pub fn create(
        input: InvitationInput,
        club_id: ClubId,
        invited_by: UserId,
    ) -> Result<Self, DomainError> {
        Self::create_at(input, club_id, invited_by, Utc::now())
    }

    /// Create a pending invitation issued at `now`
    pub fn create_at(
        input: InvitationInput,
        club_id: ClubId,
        invited_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if club_id.is_blank() {
            return Err(DomainError::validation("club id is required"));
        }
        if invited_by.is_blank() {
            return Err(DomainError::validation("inviter id is required"));
        }
        if input.role == ClubRole::Owner {
            return Err(DomainError::validation("owner role cannot be offered by invitation"));
        }

        let target = match input.invitation_type {
            InvitationType::Email => {
                let email = input
                    .email
                    .as_deref()
                    .map(normalize_email)
                    .filter(|e| !e.is_empty())
                    .ok_or_else(|| DomainError::validation("email is required for email invitations"))?;
                if !email.validate_email() {
                    return Err(DomainError::InvalidEmail);
                }
                InvitationTarget::Email {
                    email,
                    token: generate_invitation_token(),
                    user_id: None,
                }
            }
            InvitationType::User => {
                let user_id = input
                    .user_id
                    .filter(|id| !id.is_blank())
                    .ok_or_else(|| DomainError::validation("user id is required for user invitations"))?;
                InvitationTarget::User { user_id }
            }
        };

        let message = input
            .message
            .map(|m| m.trim().to_owned())
            .filter(|m| !m.is_empty());
        if message
            .as_deref()
            .is_some_and(|m| m.chars().count() > MAX_INVITATION_MESSAGE_LEN)
        {
            return Err(DomainError::TooLong {
                field: "invitation message",
                max: MAX_INVITATION_MESSAGE_LEN,
            });
        }

        let days = input.expires_in_days.unwrap_or(DEFAULT_EXPIRY_DAYS);
        if !(1..=MAX_EXPIRY_DAYS).contains(&days) {
            return Err(DomainError::validation(format!(
                "invitation expiry must be between 1 and {MAX_EXPIRY_DAYS} days"
            )));
        }

        Ok(Self {
            id: InvitationId::generate(),
            club_id,
            target,
            role: input.role,
            status: InvitationStatus::Pending,
            invited_by,
            invited_at: now,
            expires_at: now + Duration::days(days),
            processed_at: None,
            message,
        })
    }

    #[inline]
    pub fn invitation_type(&self) -> InvitationType {
        self.target.invitation_type()
    }

    #[inline]
    pub fn email(&self) -> Option<&str> {
        self.target.email()
    }

    #[inline]
    pub fn token(&self) -> Option<&str> {
        self.target.token()
    }

    #[inline]
    pub fn user_id(&self) -> Option<&UserId> {
        self.target.user_id()
    }

    #[inline]
    pub fn invitee_key(&self) -> InviteeKey {
        self.target.invitee_key()
    }

    /// Accept or decline the invitation
    pub fn process(
        &self,
        action: InvitationAction,
        acting_user_id: Option<&UserId>,
    ) -> Result<Self, DomainError> {
        self.process_at(action, acting_user_id, Utc::now())
    }

    /// Accept or decline, evaluating expiry against `now`
    pub fn process_at(
        &self,
        action: InvitationAction,
        acting_user_id: Option<&UserId>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if !self.is_pending() {
            return Err(DomainError::InvitationAlreadyProcessed {
                id: self.id.clone(),
                status: self.status,
            });
        }
        if self.is_expired_at(now) {
            return Err(DomainError::InvitationExpired(self.id.clone()));
        }

        let mut next = self.clone();
        next.status = action.target_status();
        next.processed_at = Some(now);

        if action == InvitationAction::Accept {
            if let InvitationTarget::Email { user_id, .. } = &mut next.target {
                let acting = acting_user_id.filter(|id| !id.is_blank()).ok_or_else(|| {
                    DomainError::validation("accepting an email invitation requires a user id")
                })?;
                *user_id = Some(acting.clone());
            }
        }
        Ok(next)
    }

    /// Withdraw a pending invitation
    pub fn cancel(&self) -> Result<Self, DomainError> {
        if !self.can_be_cancelled() {
            return Err(DomainError::InvitationAlreadyProcessed {
                id: self.id.clone(),
                status: self.status,
            });
        }
        let mut next = self.clone();
        next.status = InvitationStatus::Cancelled;
        next.processed_at = Some(Utc::now());
        Ok(next)
    }

    /// Persistable expired state; only pending invitations may expire
    pub fn expire(&self) -> Result<Self, DomainError> {
        if !self.status.can_transition_to(InvitationStatus::Expired) {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status.as_str(),
                to: InvitationStatus::Expired.as_str(),
            });
        }
        let mut next = self.clone();
        next.status = InvitationStatus::Expired;
        next.processed_at = Some(Utc::now());
        Ok(next)
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    /// Stored as expired, or past its expiry time
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Expired || now > self.expires_at
    }

    /// Pending and not yet expired
    pub fn can_be_processed(&self) -> bool {
        self.is_pending() && !self.is_expired()
    }

    #[inline]
    pub fn can_be_cancelled(&self) -> bool {
        self.is_pending()
    }

    /// Whether this is a user invitation addressed to `user_id`
    pub fn is_addressed_to(&self, user_id: &UserId) -> bool {
        matches!(&self.target, InvitationTarget::User { user_id: target } if target == user_id)
    }
}

/// Generate an unpredictable alphanumeric delivery token
pub fn generate_invitation_token() -> String {
    use rand::Rng;

    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    let mut rng = rand::thread_rng();
    (0..INVITATION_TOKEN_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
