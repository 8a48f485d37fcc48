//! Test helpers for integration tests
//!
//! Provides an in-memory `ServiceContext` plus seeding shortcuts.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use club_cache::InMemoryCapabilityCache;
use club_common::PaginationConfig;
use club_core::{
    ActorContext, AuditEvent, AuditSink, Club, ClubDirectory, ClubId, ClubRole,
    InvitationRepository, JoinPolicy, Membership, MembershipStatus, NewMembership, RepoResult, User, UserDirectory, UserId,
};
use club_db::{KvInvitationRepository, KvMembershipRepository, MemoryItemStore};
use club_service::{
    AuthorizationService, InvitationService, MembershipService, ServiceContext,
    ServiceContextBuilder,
};

use crate::fixtures::{unique_club_id, unique_suffix, unique_user_id};

// ============================================================================
// Fake collaborators
// ============================================================================

/// Club lookup backed by a map
#[derive(Default)]
pub struct FakeClubDirectory {
    clubs: RwLock<HashMap<ClubId, Club>>,
}

impl FakeClubDirectory {
    pub fn insert(&self, club: Club) {
        self.clubs.write().insert(club.id.clone(), club);
    }
}

#[async_trait]
impl ClubDirectory for FakeClubDirectory {
    async fn get_club_by_id(&self, id: &ClubId) -> RepoResult<Option<Club>> {
        Ok(self.clubs.read().get(id).cloned())
    }
}

/// User lookup backed by a map
#[derive(Default)]
pub struct FakeUserDirectory {
    users: RwLock<HashMap<UserId, User>>,
}

impl FakeUserDirectory {
    pub fn insert(&self, user: User) {
        self.users.write().insert(user.id.clone(), user);
    }
}

#[async_trait]
impl UserDirectory for FakeUserDirectory {
    async fn get_user_by_id(&self, id: &UserId) -> RepoResult<Option<User>> {
        Ok(self.users.read().get(id).cloned())
    }
}

/// Audit sink that keeps every event
#[derive(Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    /// Most recent event for `operation`
    pub fn last(&self, operation: &str) -> Option<AuditEvent> {
        self.events
            .lock()
            .iter()
            .rev()
            .find(|e| e.operation == operation)
            .cloned()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().push(event.clone());
    }
}

// ============================================================================
// Harness
// ============================================================================

/// In-memory service context with handles on every fake
pub struct TestHarness {
    pub ctx: ServiceContext,
    pub store: Arc<MemoryItemStore>,
    pub clubs: Arc<FakeClubDirectory>,
    pub users: Arc<FakeUserDirectory>,
    pub audit: Arc<RecordingAuditSink>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_pagination(PaginationConfig::default())
    }

    pub fn with_pagination(pagination: PaginationConfig) -> Self {
        Self::build(pagination, |repo| Arc::new(repo))
    }

    /// Harness whose invitation repository is wrapped by `wrap`
    pub fn with_invitation_repo<F>(wrap: F) -> Self
    where
        F: FnOnce(KvInvitationRepository) -> Arc<dyn InvitationRepository>,
    {
        Self::build(PaginationConfig::default(), wrap)
    }

    fn build<F>(pagination: PaginationConfig, wrap: F) -> Self
    where
        F: FnOnce(KvInvitationRepository) -> Arc<dyn InvitationRepository>,
    {
        let store = Arc::new(MemoryItemStore::new());
        let clubs = Arc::new(FakeClubDirectory::default());
        let users = Arc::new(FakeUserDirectory::default());
        let audit = Arc::new(RecordingAuditSink::default());

        let ctx = ServiceContextBuilder::new()
            .membership_repo(Arc::new(KvMembershipRepository::new(store.clone())))
            .invitation_repo(wrap(KvInvitationRepository::new(store.clone())))
            .club_directory(clubs.clone())
            .user_directory(users.clone())
            .capability_cache(Arc::new(InMemoryCapabilityCache::new(Duration::from_secs(60))))
            .audit_sink(audit.clone())
            .pagination(pagination)
            .build()
            .unwrap_or_else(|e| panic!("test context: {e}"));

        Self {
            ctx,
            store,
            clubs,
            users,
            audit,
        }
    }

    pub fn memberships(&self) -> MembershipService<'_> {
        MembershipService::new(&self.ctx)
    }

    pub fn invitations(&self) -> InvitationService<'_> {
        InvitationService::new(&self.ctx)
    }

    pub fn authz(&self) -> AuthorizationService<'_> {
        AuthorizationService::new(&self.ctx)
    }

    /// Register a club with the given join policy
    pub fn club(&self, policy: JoinPolicy) -> ClubId {
        let id = unique_club_id();
        self.clubs
            .insert(Club::new(id.clone(), format!("Club {id}"), policy));
        id
    }

    /// Register a user with a profile email
    pub fn user_with_email(&self, email: &str) -> ActorContext {
        let id = unique_user_id();
        self.users.insert(
            User::new(id.clone(), format!("Rider {}", unique_suffix())).with_email(email),
        );
        ActorContext::new(id)
    }

    /// Register a user without an email
    pub fn user(&self) -> ActorContext {
        let id = unique_user_id();
        self.users
            .insert(User::new(id.clone(), format!("Rider {}", unique_suffix())));
        ActorContext::new(id)
    }

    /// Register a user who is already an active member with `role`
    pub async fn member(&self, club_id: &ClubId, role: ClubRole) -> ActorContext {
        let actor = self.user();
        let membership = Membership::create(
            NewMembership::new(club_id.clone(), actor.user_id.clone())
                .with_role(role)
                .with_status(MembershipStatus::Active),
        )
        .unwrap_or_else(|e| panic!("seed membership: {e}"));
        self.ctx
            .membership_repo()
            .create(&membership)
            .await
            .unwrap_or_else(|e| panic!("seed membership: {e}"));
        actor
    }

    /// Stored membership, if any
    pub async fn stored_membership(&self, club_id: &ClubId, user_id: &UserId) -> Option<Membership> {
        self.ctx
            .membership_repo()
            .find(club_id, user_id)
            .await
            .unwrap_or_else(|e| panic!("read membership: {e}"))
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
