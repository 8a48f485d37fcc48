//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Every write persists the canonical record and
//! its index records atomically.

use async_trait::async_trait;

use crate::entities::{Invitation, InviteeKey, Membership};
use crate::error::DomainError;
use crate::value_objects::{
    ClubId, ClubRole, InvitationId, InvitationStatus, MembershipStatus, UserId,
};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Present only when more records exist past this page
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self { items, next_cursor }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}

// ============================================================================
// Filters
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MembershipFilter {
    pub role: Option<ClubRole>,
    pub status: Option<MembershipStatus>,
}

impl MembershipFilter {
    pub fn with_role(mut self, role: ClubRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_status(mut self, status: MembershipStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, membership: &Membership) -> bool {
        self.role.is_none_or(|r| r == membership.role)
            && self.status.is_none_or(|s| s == membership.status)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvitationFilter {
    pub status: Option<InvitationStatus>,
}

impl InvitationFilter {
    pub fn with_status(mut self, status: InvitationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, invitation: &Invitation) -> bool {
        self.status.is_none_or(|s| s == invitation.status)
    }
}

// ============================================================================
// Membership Repository
// ============================================================================

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Find the membership for a (club, user) pair
    async fn find(&self, club_id: &ClubId, user_id: &UserId) -> RepoResult<Option<Membership>>;

    /// List a club's memberships in user-id order
    async fn list_by_club(
        &self,
        club_id: &ClubId,
        filter: MembershipFilter,
        cursor: Option<&str>,
        limit: usize,
    ) -> RepoResult<Page<Membership>>;

    /// List every membership a user holds
    async fn list_by_user(
        &self,
        user_id: &UserId,
        filter: MembershipFilter,
    ) -> RepoResult<Vec<Membership>>;

    /// Create a membership; fails with `AlreadyMember` if a non-removed one exists
    async fn create(&self, membership: &Membership) -> RepoResult<()>;

    /// Persist a status transition computed from `previous`
    async fn update_status(&self, previous: &Membership, updated: &Membership) -> RepoResult<()>;

    /// Persist a role transition computed from `previous`
    async fn update_role(&self, previous: &Membership, updated: &Membership) -> RepoResult<()>;
}

// ============================================================================
// Invitation Repository
// ============================================================================

#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// Find invitation by ID
    async fn find_by_id(&self, id: &InvitationId) -> RepoResult<Option<Invitation>>;

    /// Find an email invitation by its delivery token
    async fn find_by_token(&self, token: &str) -> RepoResult<Option<Invitation>>;

    /// The pending invitation for this invitee in this club, if any
    async fn find_pending_for(
        &self,
        club_id: &ClubId,
        invitee: &InviteeKey,
    ) -> RepoResult<Option<Invitation>>;

    /// Check whether a pending invitation exists for this invitee in this club
    async fn has_pending_invitation(
        &self,
        club_id: &ClubId,
        invitee: &InviteeKey,
    ) -> RepoResult<bool>;

    /// List a club's invitations, oldest first
    async fn list_by_club(
        &self,
        club_id: &ClubId,
        filter: InvitationFilter,
        cursor: Option<&str>,
        limit: usize,
    ) -> RepoResult<Page<Invitation>>;

    /// Invitations addressed to a user id and, optionally, to the user's email
    async fn list_by_user(
        &self,
        user_id: &UserId,
        email: Option<&str>,
        filter: InvitationFilter,
    ) -> RepoResult<Vec<Invitation>>;

    /// Create a pending invitation; fails with `UserAlreadyInvited` on a duplicate
    async fn create(&self, invitation: &Invitation) -> RepoResult<()>;

    /// Persist a status transition computed from `previous`
    async fn update_status(&self, previous: &Invitation, updated: &Invitation) -> RepoResult<()>;

    /// Persist an acceptance together with the membership it grants.
    ///
    /// Both writes apply or neither does. Fails with `AlreadyMember` when the
    /// invitee holds a non-removed membership, and with a concurrent
    /// modification when `previous` is no longer the stored invitation.
    async fn accept(
        &self,
        previous: &Invitation,
        accepted: &Invitation,
        membership: &Membership,
    ) -> RepoResult<()>;
}
