//! Domain errors - error types for the domain layer

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::value_objects::{ClubId, ClubRole, InvitationId, InvitationStatus, UserId};

/// Stable, machine-readable classification of every failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Authorization,
    Conflict,
    InvitationExpired,
    InvitationAlreadyProcessed,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION",
            Self::NotFound => "NOT_FOUND",
            Self::Authorization => "AUTHORIZATION",
            Self::Conflict => "CONFLICT",
            Self::InvitationExpired => "INVITATION_EXPIRED",
            Self::InvitationAlreadyProcessed => "INVITATION_ALREADY_PROCESSED",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Club not found: {0}")]
    ClubNotFound(ClubId),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Membership not found for user {user_id} in club {club_id}")]
    MembershipNotFound { club_id: ClubId, user_id: UserId },

    #[error("Invitation not found: {0}")]
    InvitationNotFound(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("{field} too long: max {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: &'static str, to: &'static str },

    #[error("Invalid role transition from {from} to {to}")]
    InvalidRoleTransition { from: ClubRole, to: ClubRole },

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Insufficient privileges: {actor_id} lacks {capability} in club {club_id}")]
    InsufficientPrivileges {
        actor_id: UserId,
        club_id: ClubId,
        capability: String,
    },

    #[error("Role assignment denied: {reason}")]
    RoleAssignmentDenied {
        actor_id: UserId,
        club_id: ClubId,
        target_role: ClubRole,
        reason: &'static str,
    },

    #[error("{actor_id} cannot manage a member with role {target_role} in club {club_id}")]
    CannotManageMember {
        actor_id: UserId,
        club_id: ClubId,
        target_role: ClubRole,
    },

    #[error("Invitation is not addressed to this user")]
    NotInvitationRecipient,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("User {user_id} is already a member of club {club_id}")]
    AlreadyMember { club_id: ClubId, user_id: UserId },

    #[error("{target} already has a pending invitation to club {club_id}")]
    UserAlreadyInvited { club_id: ClubId, target: String },

    #[error("Record was modified concurrently: {0}")]
    ConcurrentModification(String),

    // =========================================================================
    // Invitation Terminal States
    // =========================================================================
    #[error("Invitation has expired: {0}")]
    InvitationExpired(InvitationId),

    #[error("Invitation {id} cannot be processed (status: {status})")]
    InvitationAlreadyProcessed {
        id: InvitationId,
        status: InvitationStatus,
    },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::ClubNotFound(_) => "UNKNOWN_CLUB",
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::MembershipNotFound { .. } => "UNKNOWN_MEMBERSHIP",
            Self::InvitationNotFound(_) => "UNKNOWN_INVITATION",

            // Validation
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::TooLong { .. } => "CONTENT_TOO_LONG",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::InvalidRoleTransition { .. } => "INVALID_ROLE_TRANSITION",

            // Authorization
            Self::InsufficientPrivileges { .. } => "INSUFFICIENT_PRIVILEGES",
            Self::RoleAssignmentDenied { .. } => "ROLE_ASSIGNMENT_DENIED",
            Self::CannotManageMember { .. } => "CANNOT_MANAGE_MEMBER",
            Self::NotInvitationRecipient => "NOT_INVITATION_RECIPIENT",

            // Conflict
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::AlreadyMember { .. } => "ALREADY_MEMBER",
            Self::UserAlreadyInvited { .. } => "USER_ALREADY_INVITED",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",

            // Invitation terminal states
            Self::InvitationExpired(_) => "INVITATION_EXPIRED",
            Self::InvitationAlreadyProcessed { .. } => "INVITATION_ALREADY_PROCESSED",

            // Infrastructure
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ClubNotFound(_)
            | Self::UserNotFound(_)
            | Self::MembershipNotFound { .. }
            | Self::InvitationNotFound(_) => ErrorKind::NotFound,

            Self::Validation(_)
            | Self::InvalidEmail
            | Self::TooLong { .. }
            | Self::InvalidStatusTransition { .. }
            | Self::InvalidRoleTransition { .. } => ErrorKind::Validation,

            Self::InsufficientPrivileges { .. }
            | Self::RoleAssignmentDenied { .. }
            | Self::CannotManageMember { .. }
            | Self::NotInvitationRecipient => ErrorKind::Authorization,

            Self::AlreadyExists(_)
            | Self::AlreadyMember { .. }
            | Self::UserAlreadyInvited { .. }
            | Self::ConcurrentModification(_) => ErrorKind::Conflict,

            Self::InvitationExpired(_) => ErrorKind::InvitationExpired,
            Self::InvitationAlreadyProcessed { .. } => ErrorKind::InvitationAlreadyProcessed,

            Self::Storage(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Shorthand for a validation failure
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        self.kind() == ErrorKind::Authorization
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    /// Invitation expired or already processed
    pub fn is_invitation_terminal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvitationExpired | ErrorKind::InvitationAlreadyProcessed
        )
    }
}
