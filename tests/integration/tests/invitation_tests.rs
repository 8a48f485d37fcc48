//! Invitation workflow tests
//!
//! Run with: cargo test -p integration-tests --test invitation_tests

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use club_core::{
    ActorContext, AuditOutcome, ClubId, ClubRole, Invitation, InvitationFilter, InvitationId,
    InvitationInput, InvitationRepository, InvitationStatus, InviteeKey, JoinPolicy, Membership,
    MembershipStatus, Page, RepoResult, UserId,
};
use club_db::KvInvitationRepository;
use club_service::dto::{
    InviteByEmailRequest, InviteUserRequest, JoinClubRequest, ListInvitationsQuery,
    ProcessInvitationRequest,
};
use club_service::InvitationService;
use integration_tests::{unique_email, unique_user_id, TestHarness};

fn id_of(raw: &str) -> InvitationId {
    InvitationId::from(raw)
}

/// Store an invitation issued `days_ago` with a one-day expiry
async fn seed_stale_invitation(
    h: &TestHarness,
    input: InvitationInput,
    club: &ClubId,
    inviter: &ActorContext,
    days_ago: i64,
) -> Invitation {
    let invitation = Invitation::create_at(
        input.with_expires_in_days(Some(1)),
        club.clone(),
        inviter.user_id.clone(),
        Utc::now() - Duration::days(days_ago),
    )
    .unwrap();
    h.ctx.invitation_repo().create(&invitation).await.unwrap();
    invitation
}

/// Cancels every pending invitation right after handing out a copy of it,
/// as if the inviter withdrew it while the invitee was answering
struct CancelledWhileAnswering {
    inner: KvInvitationRepository,
}

#[async_trait]
impl InvitationRepository for CancelledWhileAnswering {
    async fn find_by_id(&self, id: &InvitationId) -> RepoResult<Option<Invitation>> {
        let found = self.inner.find_by_id(id).await?;
        if let Some(invitation) = found.as_ref().filter(|i| i.is_pending()) {
            self.inner.update_status(invitation, &invitation.cancel()?).await?;
        }
        Ok(found)
    }

    async fn find_by_token(&self, token: &str) -> RepoResult<Option<Invitation>> {
        self.inner.find_by_token(token).await
    }

    async fn find_pending_for(
        &self,
        club_id: &ClubId,
        invitee: &InviteeKey,
    ) -> RepoResult<Option<Invitation>> {
        self.inner.find_pending_for(club_id, invitee).await
    }

    async fn has_pending_invitation(
        &self,
        club_id: &ClubId,
        invitee: &InviteeKey,
    ) -> RepoResult<bool> {
        self.inner.has_pending_invitation(club_id, invitee).await
    }

    async fn list_by_club(
        &self,
        club_id: &ClubId,
        filter: InvitationFilter,
        cursor: Option<&str>,
        limit: usize,
    ) -> RepoResult<Page<Invitation>> {
        self.inner.list_by_club(club_id, filter, cursor, limit).await
    }

    async fn list_by_user(
        &self,
        user_id: &UserId,
        email: Option<&str>,
        filter: InvitationFilter,
    ) -> RepoResult<Vec<Invitation>> {
        self.inner.list_by_user(user_id, email, filter).await
    }

    async fn create(&self, invitation: &Invitation) -> RepoResult<()> {
        self.inner.create(invitation).await
    }

    async fn update_status(&self, previous: &Invitation, updated: &Invitation) -> RepoResult<()> {
        self.inner.update_status(previous, updated).await
    }

    async fn accept(
        &self,
        previous: &Invitation,
        accepted: &Invitation,
        membership: &Membership,
    ) -> RepoResult<()> {
        self.inner.accept(previous, accepted, membership).await
    }
}

// ============================================================================
// User invitations
// ============================================================================

#[tokio::test]
async fn test_invite_and_accept_user_invitation() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Approval);
    let admin = h.member(&club, ClubRole::Admin).await;
    let rider = h.user();

    let sent = h
        .invitations()
        .invite_user(&admin, &club, InviteUserRequest::new(rider.user_id.as_str(), ClubRole::Captain))
        .await
        .unwrap();
    assert_eq!(sent.status, InvitationStatus::Pending);
    assert_eq!(sent.invited_by, admin.user_id.as_str());
    assert!(sent.token.is_none());
    assert!(sent.expires_at > sent.invited_at);

    let answered = h
        .invitations()
        .process_invitation(&rider, &id_of(&sent.id), ProcessInvitationRequest::accept())
        .await
        .unwrap();
    assert_eq!(answered.invitation.status, InvitationStatus::Accepted);
    assert!(answered.invitation.processed_at.is_some());

    let membership = answered.membership.unwrap();
    assert_eq!(membership.role, ClubRole::Captain);
    assert_eq!(membership.status, MembershipStatus::Active);
    assert_eq!(membership.invited_by.as_deref(), Some(admin.user_id.as_str()));

    let err = h
        .invitations()
        .process_invitation(&rider, &id_of(&sent.id), ProcessInvitationRequest::decline())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVITATION_ALREADY_PROCESSED");
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn test_invite_user_preconditions() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let admin = h.member(&club, ClubRole::Admin).await;
    let captain = h.member(&club, ClubRole::Captain).await;
    let member = h.member(&club, ClubRole::Member).await;
    let rider = h.user();

    let err = h
        .invitations()
        .invite_user(&captain, &club, InviteUserRequest::new(rider.user_id.as_str(), ClubRole::Member))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INSUFFICIENT_PRIVILEGES");

    let err = h
        .invitations()
        .invite_user(&admin, &club, InviteUserRequest::new(member.user_id.as_str(), ClubRole::Member))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ALREADY_MEMBER");

    let err = h
        .invitations()
        .invite_user(&admin, &club, InviteUserRequest::new(unique_user_id().as_str(), ClubRole::Member))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_USER");

    // Admins cannot hand out admin through an invitation
    let err = h
        .invitations()
        .invite_user(&admin, &club, InviteUserRequest::new(rider.user_id.as_str(), ClubRole::Admin))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ROLE_ASSIGNMENT_DENIED");

    let mut too_long = InviteUserRequest::new(rider.user_id.as_str(), ClubRole::Member);
    too_long.expires_in_days = Some(31);
    let err = h
        .invitations()
        .invite_user(&admin, &club, too_long)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");

    h.invitations()
        .invite_user(&admin, &club, InviteUserRequest::new(rider.user_id.as_str(), ClubRole::Member))
        .await
        .unwrap();
    let err = h
        .invitations()
        .invite_user(&admin, &club, InviteUserRequest::new(rider.user_id.as_str(), ClubRole::Captain))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "USER_ALREADY_INVITED");
}

#[tokio::test]
async fn test_only_the_invitee_may_answer() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let owner = h.member(&club, ClubRole::Owner).await;
    let rider = h.user();
    let stranger = h.user();

    let sent = h
        .invitations()
        .invite_user(&owner, &club, InviteUserRequest::new(rider.user_id.as_str(), ClubRole::Admin))
        .await
        .unwrap();

    let err = h
        .invitations()
        .process_invitation(&stranger, &id_of(&sent.id), ProcessInvitationRequest::accept())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "NOT_INVITATION_RECIPIENT");
    assert_eq!(err.status_code(), 403);
    assert!(h.stored_membership(&club, &stranger.user_id).await.is_none());

    let err = h
        .invitations()
        .process_invitation(&rider, &InvitationId::generate(), ProcessInvitationRequest::accept())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_INVITATION");
}

#[tokio::test]
async fn test_accept_after_joining_independently() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let admin = h.member(&club, ClubRole::Admin).await;
    let rider = h.user();

    let sent = h
        .invitations()
        .invite_user(&admin, &club, InviteUserRequest::new(rider.user_id.as_str(), ClubRole::Captain))
        .await
        .unwrap();
    h.memberships()
        .join_club(&rider, &club, JoinClubRequest::default())
        .await
        .unwrap();

    let err = h
        .invitations()
        .process_invitation(&rider, &id_of(&sent.id), ProcessInvitationRequest::accept())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ALREADY_MEMBER");

    // The join stands and the invitation can still be declined
    let membership = h.stored_membership(&club, &rider.user_id).await.unwrap();
    assert_eq!(membership.role, ClubRole::Member);
    let declined = h
        .invitations()
        .process_invitation(&rider, &id_of(&sent.id), ProcessInvitationRequest::decline())
        .await
        .unwrap();
    assert_eq!(declined.invitation.status, InvitationStatus::Declined);
}

#[tokio::test]
async fn test_accept_losing_to_cancel_leaves_no_membership() {
    let h = TestHarness::with_invitation_repo(|inner| Arc::new(CancelledWhileAnswering { inner }));
    let club = h.club(JoinPolicy::Open);
    let admin = h.member(&club, ClubRole::Admin).await;
    let rider = h.user();

    let sent = h
        .invitations()
        .invite_user(&admin, &club, InviteUserRequest::new(rider.user_id.as_str(), ClubRole::Captain))
        .await
        .unwrap();

    let err = h
        .invitations()
        .process_invitation(&rider, &id_of(&sent.id), ProcessInvitationRequest::accept())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "CONCURRENT_MODIFICATION");

    assert!(h.stored_membership(&club, &rider.user_id).await.is_none());
    let listed = h
        .ctx
        .invitation_repo()
        .list_by_club(&club, InvitationFilter::default(), None, 10)
        .await
        .unwrap();
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].status, InvitationStatus::Cancelled);

    let event = h.audit.last("process_invitation").unwrap();
    assert!(matches!(
        event.outcome,
        AuditOutcome::Failure { code: "CONCURRENT_MODIFICATION", .. }
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_accepts_create_one_membership() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let admin = h.member(&club, ClubRole::Admin).await;
    let rider = h.user();

    let sent = h
        .invitations()
        .invite_user(&admin, &club, InviteUserRequest::new(rider.user_id.as_str(), ClubRole::Member))
        .await
        .unwrap();
    let invitation_id = id_of(&sent.id);

    let ctx = Arc::new(h.ctx.clone());
    let mut handles = Vec::new();
    for _ in 0..6 {
        let ctx = ctx.clone();
        let rider = rider.clone();
        let invitation_id = invitation_id.clone();
        handles.push(tokio::spawn(async move {
            InvitationService::new(&ctx)
                .process_invitation(&rider, &invitation_id, ProcessInvitationRequest::accept())
                .await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(e) => assert!(
                matches!(
                    e.error_code(),
                    "ALREADY_MEMBER" | "INVITATION_ALREADY_PROCESSED" | "CONCURRENT_MODIFICATION"
                ),
                "unexpected error: {e}"
            ),
        }
    }
    assert_eq!(accepted, 1);

    let stored = h
        .ctx
        .invitation_repo()
        .find_by_id(&invitation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, InvitationStatus::Accepted);
    let mine = h.memberships().list_my_memberships(&rider, None).await.unwrap();
    assert_eq!(mine.len(), 1);
}

// ============================================================================
// Email invitations
// ============================================================================

#[tokio::test]
async fn test_email_invitation_accepted_by_token() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Approval);
    let admin = h.member(&club, ClubRole::Admin).await;
    let email = unique_email();

    let sent = h
        .invitations()
        .invite_by_email(&admin, &club, InviteByEmailRequest::new(email.to_uppercase(), ClubRole::Member))
        .await
        .unwrap();
    assert_eq!(sent.email.as_deref(), Some(email.as_str()));
    assert!(sent.user_id.is_none());
    let token = sent.token.clone().unwrap();

    let err = h
        .invitations()
        .invite_by_email(&admin, &club, InviteByEmailRequest::new(email.clone(), ClubRole::Member))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "USER_ALREADY_INVITED");

    let impostor = h.user_with_email(&unique_email());
    let err = h
        .invitations()
        .process_invitation_by_token(&impostor, &token, ProcessInvitationRequest::accept())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "NOT_INVITATION_RECIPIENT");

    let rider = h.user_with_email(&email);
    let pending = h.invitations().list_my_invitations(&rider, None).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert!(pending[0].token.is_none());

    let answered = h
        .invitations()
        .process_invitation_by_token(&rider, &token, ProcessInvitationRequest::accept())
        .await
        .unwrap();
    assert_eq!(answered.invitation.status, InvitationStatus::Accepted);
    assert_eq!(answered.invitation.user_id.as_deref(), Some(rider.user_id.as_str()));
    assert!(answered.membership.is_some());

    // Still listed for the user once it carries their id
    let accepted = h
        .invitations()
        .list_my_invitations(&rider, Some(InvitationStatus::Accepted))
        .await
        .unwrap();
    assert_eq!(accepted.len(), 1);

    let err = h
        .invitations()
        .process_invitation_by_token(&rider, "no-such-token", ProcessInvitationRequest::accept())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_INVITATION");
}

#[tokio::test]
async fn test_declined_email_invitation_keeps_no_user() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let owner = h.member(&club, ClubRole::Owner).await;
    let email = unique_email();
    let rider = h.user_with_email(&email);

    let sent = h
        .invitations()
        .invite_by_email(&owner, &club, InviteByEmailRequest::new(email, ClubRole::Admin))
        .await
        .unwrap();
    let answered = h
        .invitations()
        .process_invitation(&rider, &id_of(&sent.id), ProcessInvitationRequest::decline())
        .await
        .unwrap();

    assert_eq!(answered.invitation.status, InvitationStatus::Declined);
    assert!(answered.invitation.user_id.is_none());
    assert!(answered.membership.is_none());
    assert!(h.stored_membership(&club, &rider.user_id).await.is_none());
}

#[tokio::test]
async fn test_invalid_email_rejected() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let admin = h.member(&club, ClubRole::Admin).await;

    let err = h
        .invitations()
        .invite_by_email(&admin, &club, InviteByEmailRequest::new("not-an-email", ClubRole::Member))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
    assert_eq!(err.status_code(), 400);
}

// ============================================================================
// Expiry
// ============================================================================

#[tokio::test]
async fn test_expired_invitation_cannot_be_accepted() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let admin = h.member(&club, ClubRole::Admin).await;
    let rider = h.user();

    let stale = seed_stale_invitation(
        &h,
        InvitationInput::for_user(rider.user_id.clone(), ClubRole::Member),
        &club,
        &admin,
        3,
    )
    .await;

    let err = h
        .invitations()
        .process_invitation(&rider, &stale.id, ProcessInvitationRequest::accept())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVITATION_EXPIRED");
    assert_eq!(err.status_code(), 410);

    let stored = h
        .ctx
        .invitation_repo()
        .find_by_id(&stale.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, InvitationStatus::Expired);
    assert!(h.stored_membership(&club, &rider.user_id).await.is_none());

    // A fresh invitation can replace the expired one
    h.invitations()
        .invite_user(&admin, &club, InviteUserRequest::new(rider.user_id.as_str(), ClubRole::Member))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_stale_pending_does_not_block_reinvite() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let admin = h.member(&club, ClubRole::Admin).await;
    let email = unique_email();

    let stale = seed_stale_invitation(
        &h,
        InvitationInput::for_email(email.clone(), ClubRole::Member),
        &club,
        &admin,
        2,
    )
    .await;

    let fresh = h
        .invitations()
        .invite_by_email(&admin, &club, InviteByEmailRequest::new(email, ClubRole::Member))
        .await
        .unwrap();
    assert_ne!(fresh.id, stale.id.as_str());

    let stored = h
        .ctx
        .invitation_repo()
        .find_by_id(&stale.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, InvitationStatus::Expired);
}

#[tokio::test]
async fn test_expire_stale_invitations_sweep() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let admin = h.member(&club, ClubRole::Admin).await;
    let member = h.member(&club, ClubRole::Member).await;

    for _ in 0..3 {
        seed_stale_invitation(
            &h,
            InvitationInput::for_email(unique_email(), ClubRole::Member),
            &club,
            &admin,
            5,
        )
        .await;
    }
    let live = h.user();
    h.invitations()
        .invite_user(&admin, &club, InviteUserRequest::new(live.user_id.as_str(), ClubRole::Member))
        .await
        .unwrap();

    let err = h
        .invitations()
        .expire_stale_invitations(&member, &club)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INSUFFICIENT_PRIVILEGES");

    let swept = h
        .invitations()
        .expire_stale_invitations(&admin, &club)
        .await
        .unwrap();
    assert_eq!(swept.expired, 3);

    let again = h
        .invitations()
        .expire_stale_invitations(&admin, &club)
        .await
        .unwrap();
    assert_eq!(again.expired, 0);

    let pending = h
        .invitations()
        .list_club_invitations(
            &admin,
            &club,
            ListInvitationsQuery {
                status: Some(InvitationStatus::Pending),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(pending.items.len(), 1);
    assert!(!pending.items[0].is_expired);
}

// ============================================================================
// Cancellation and listing
// ============================================================================

#[tokio::test]
async fn test_cancel_rules() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let admin = h.member(&club, ClubRole::Admin).await;
    let member = h.member(&club, ClubRole::Member).await;
    let rider = h.user();

    let sent = h
        .invitations()
        .invite_user(&admin, &club, InviteUserRequest::new(rider.user_id.as_str(), ClubRole::Member))
        .await
        .unwrap();
    let id = id_of(&sent.id);

    let err = h.invitations().cancel_invitation(&member, &id).await.unwrap_err();
    assert_eq!(err.error_code(), "INSUFFICIENT_PRIVILEGES");

    let cancelled = h.invitations().cancel_invitation(&admin, &id).await.unwrap();
    assert_eq!(cancelled.status, InvitationStatus::Cancelled);

    let err = h.invitations().cancel_invitation(&admin, &id).await.unwrap_err();
    assert_eq!(err.error_code(), "INVITATION_ALREADY_PROCESSED");

    let err = h
        .invitations()
        .process_invitation(&rider, &id, ProcessInvitationRequest::accept())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVITATION_ALREADY_PROCESSED");

    // Cancelling releases the invitee for a new invitation
    h.invitations()
        .invite_user(&admin, &club, InviteUserRequest::new(rider.user_id.as_str(), ClubRole::Captain))
        .await
        .unwrap();

    let event = h.audit.last("cancel_invitation").unwrap();
    assert_eq!(event.actor_id, admin.user_id);
    assert!(event.club_id.is_none());
}

#[tokio::test]
async fn test_list_club_invitations_pages() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let admin = h.member(&club, ClubRole::Admin).await;
    let captain = h.member(&club, ClubRole::Captain).await;
    for _ in 0..5 {
        h.invitations()
            .invite_by_email(&admin, &club, InviteByEmailRequest::new(unique_email(), ClubRole::Member))
            .await
            .unwrap();
    }

    let err = h
        .invitations()
        .list_club_invitations(&captain, &club, ListInvitationsQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INSUFFICIENT_PRIVILEGES");

    let mut seen = Vec::new();
    let mut cursor = None;
    loop {
        let page = h
            .invitations()
            .list_club_invitations(
                &admin,
                &club,
                ListInvitationsQuery {
                    cursor: cursor.take(),
                    limit: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(page.items.iter().all(|i| i.token.is_none()));
        seen.extend(page.items.into_iter().map(|i| i.id));
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    assert_eq!(seen.len(), 5);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 5);
}

#[tokio::test]
async fn test_site_admin_invites_without_membership() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let site_admin = ActorContext::site_admin(unique_user_id());
    let rider = h.user();

    let caps = h.authz().effective_capabilities(&site_admin, &club).await.unwrap();
    assert!(caps.system_override);
    assert!(caps.role.is_none());
    assert!(caps.capabilities.contains(&"assign-admin-role"));

    let sent = h
        .invitations()
        .invite_user(&site_admin, &club, InviteUserRequest::new(rider.user_id.as_str(), ClubRole::Admin))
        .await
        .unwrap();
    assert_eq!(sent.role, ClubRole::Admin);
}

#[tokio::test]
async fn test_token_only_serialized_for_inviter() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let admin = h.member(&club, ClubRole::Admin).await;
    let email = unique_email();
    let rider = h.user_with_email(&email);

    let sent = h
        .invitations()
        .invite_by_email(&admin, &club, InviteByEmailRequest::new(email, ClubRole::Member))
        .await
        .unwrap();
    let json = serde_json::to_value(&sent).unwrap();
    assert_eq!(json["invitation_type"], "email");
    assert!(json["token"].is_string());

    let mine = h.invitations().list_my_invitations(&rider, None).await.unwrap();
    let json = serde_json::to_value(&mine).unwrap();
    assert!(json[0].get("token").is_none());
    assert_eq!(json[0]["status"], "pending");
}
