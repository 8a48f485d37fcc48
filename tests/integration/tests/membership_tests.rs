//! Membership workflow tests
//!
//! Run with: cargo test -p integration-tests --test membership_tests

use std::sync::Arc;

use club_core::{
    ActorContext, AuditOutcome, Capabilities, ClubId, ClubRole, JoinPolicy, MembershipStatus,
};
use club_service::dto::{
    JoinClubRequest, ListMembersQuery, MemberActionRequest, ProcessJoinRequest,
    UpdateMemberRoleRequest,
};
use club_service::MembershipService;
use integration_tests::{unique_club_id, unique_user_id, TestHarness};

// ============================================================================
// Join / leave
// ============================================================================

#[tokio::test]
async fn test_join_follows_club_policy() {
    let h = TestHarness::new();
    let open = h.club(JoinPolicy::Open);
    let approval = h.club(JoinPolicy::Approval);
    let rider = h.user();

    let joined = h
        .memberships()
        .join_club(&rider, &open, JoinClubRequest::default())
        .await
        .unwrap();
    assert_eq!(joined.status, MembershipStatus::Active);
    assert_eq!(joined.role, ClubRole::Member);

    let requested = h
        .memberships()
        .join_club(&rider, &approval, JoinClubRequest::with_message("Weekend rides please"))
        .await
        .unwrap();
    assert_eq!(requested.status, MembershipStatus::Pending);
    assert_eq!(requested.join_message.as_deref(), Some("Weekend rides please"));
}

#[tokio::test]
async fn test_join_rejects_duplicates_and_unknown_clubs() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Approval);
    let rider = h.user();

    h.memberships()
        .join_club(&rider, &club, JoinClubRequest::default())
        .await
        .unwrap();
    let err = h
        .memberships()
        .join_club(&rider, &club, JoinClubRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ALREADY_MEMBER");

    let err = h
        .memberships()
        .join_club(&rider, &unique_club_id(), JoinClubRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_CLUB");

    let err = h
        .memberships()
        .join_club(&rider, &club, JoinClubRequest::with_message("x".repeat(501)))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_create_exactly_one_membership() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let rider = h.user();

    let ctx = Arc::new(h.ctx.clone());
    let mut handles = Vec::new();
    for _ in 0..8 {
        let ctx = ctx.clone();
        let club = club.clone();
        let rider = rider.clone();
        handles.push(tokio::spawn(async move {
            MembershipService::new(&ctx)
                .join_club(&rider, &club, JoinClubRequest::default())
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert_eq!(e.error_code(), "ALREADY_MEMBER"),
        }
    }
    assert_eq!(created, 1);

    let mine = h.memberships().list_my_memberships(&rider, None).await.unwrap();
    assert_eq!(mine.len(), 1);
}

#[tokio::test]
async fn test_leave_and_rejoin() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Approval);
    let rider = h.member(&club, ClubRole::Member).await;

    let left = h.memberships().leave_club(&rider, &club).await.unwrap();
    assert_eq!(left.status, MembershipStatus::Removed);
    assert_eq!(left.reason.as_deref(), Some("voluntary departure"));

    let err = h.memberships().leave_club(&rider, &club).await.unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");

    let again = h
        .memberships()
        .join_club(&rider, &club, JoinClubRequest::default())
        .await
        .unwrap();
    assert_eq!(again.status, MembershipStatus::Pending);
    assert_ne!(again.id, left.id);
}

#[tokio::test]
async fn test_owner_cannot_leave() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let owner = h.member(&club, ClubRole::Owner).await;

    let err = h.memberships().leave_club(&owner, &club).await.unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
    let stored = h.stored_membership(&club, &owner.user_id).await.unwrap();
    assert_eq!(stored.status, MembershipStatus::Active);
}

// ============================================================================
// Join requests
// ============================================================================

#[tokio::test]
async fn test_admin_approves_and_rejects_join_requests() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Approval);
    let admin = h.member(&club, ClubRole::Admin).await;
    let first = h.user();
    let second = h.user();
    for rider in [&first, &second] {
        h.memberships()
            .join_club(rider, &club, JoinClubRequest::default())
            .await
            .unwrap();
    }

    let approved = h
        .memberships()
        .process_join_request(&admin, &club, &first.user_id, ProcessJoinRequest::approve())
        .await
        .unwrap();
    assert_eq!(approved.status, MembershipStatus::Active);
    assert_eq!(approved.processed_by.as_deref(), Some(admin.user_id.as_str()));
    assert!(approved.processed_at.is_some());

    let rejected = h
        .memberships()
        .process_join_request(
            &admin,
            &club,
            &second.user_id,
            ProcessJoinRequest::reject(Some("Club is full".into())),
        )
        .await
        .unwrap();
    assert_eq!(rejected.status, MembershipStatus::Removed);
    assert_eq!(rejected.reason.as_deref(), Some("Club is full"));

    // No longer pending
    let err = h
        .memberships()
        .process_join_request(&admin, &club, &first.user_id, ProcessJoinRequest::approve())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_captain_cannot_process_join_requests() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Approval);
    let captain = h.member(&club, ClubRole::Captain).await;
    let rider = h.user();
    h.memberships()
        .join_club(&rider, &club, JoinClubRequest::default())
        .await
        .unwrap();

    let err = h
        .memberships()
        .process_join_request(&captain, &club, &rider.user_id, ProcessJoinRequest::approve())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INSUFFICIENT_PRIVILEGES");
    assert_eq!(err.status_code(), 403);

    let stored = h.stored_membership(&club, &rider.user_id).await.unwrap();
    assert!(stored.is_pending());

    let event = h.audit.last("process_join_request").unwrap();
    assert_eq!(event.actor_id, captain.user_id);
    assert_eq!(event.club_id, Some(club));
    assert!(matches!(
        event.outcome,
        AuditOutcome::Failure { code: "INSUFFICIENT_PRIVILEGES", .. }
    ));
}

// ============================================================================
// Roles
// ============================================================================

#[tokio::test]
async fn test_owner_promotes_member_to_admin() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let owner = h.member(&club, ClubRole::Owner).await;
    let rider = h.member(&club, ClubRole::Member).await;

    let updated = h
        .memberships()
        .update_member_role(&owner, &club, &rider.user_id, UpdateMemberRoleRequest::new(ClubRole::Admin))
        .await
        .unwrap();
    assert_eq!(updated.role, ClubRole::Admin);

    let admins = h
        .memberships()
        .list_club_members(
            &owner,
            &club,
            ListMembersQuery {
                role: Some(ClubRole::Admin),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(admins.items.len(), 1);
    assert_eq!(admins.items[0].membership.user_id, rider.user_id.as_str());
}

#[tokio::test]
async fn test_admin_role_rules() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let admin = h.member(&club, ClubRole::Admin).await;
    let other_admin = h.member(&club, ClubRole::Admin).await;
    let owner = h.member(&club, ClubRole::Owner).await;
    let rider = h.member(&club, ClubRole::Member).await;

    // Captain assignment is open to admins
    let captain = h
        .memberships()
        .update_member_role(&admin, &club, &rider.user_id, UpdateMemberRoleRequest::new(ClubRole::Captain))
        .await
        .unwrap();
    assert_eq!(captain.role, ClubRole::Captain);

    let err = h
        .memberships()
        .update_member_role(&admin, &club, &rider.user_id, UpdateMemberRoleRequest::new(ClubRole::Admin))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ROLE_ASSIGNMENT_DENIED");

    // Demoting a fellow admin takes an owner
    let err = h
        .memberships()
        .update_member_role(&admin, &club, &other_admin.user_id, UpdateMemberRoleRequest::new(ClubRole::Member))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ROLE_ASSIGNMENT_DENIED");

    let err = h
        .memberships()
        .update_member_role(&admin, &club, &owner.user_id, UpdateMemberRoleRequest::new(ClubRole::Member))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "CANNOT_MANAGE_MEMBER");

    let err = h
        .memberships()
        .update_member_role(&admin, &club, &admin.user_id, UpdateMemberRoleRequest::new(ClubRole::Captain))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_role_change_checks_privileges_before_lookup() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let outsider = h.user();
    let captain = h.member(&club, ClubRole::Captain).await;
    let missing = unique_user_id();

    // Same answer whether or not the target exists
    for actor in [&outsider, &captain] {
        let err = h
            .memberships()
            .update_member_role(actor, &club, &missing, UpdateMemberRoleRequest::new(ClubRole::Captain))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INSUFFICIENT_PRIVILEGES");
        assert_eq!(err.status_code(), 403);
    }
}

#[tokio::test]
async fn test_empty_capability_is_never_granted() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let owner = h.member(&club, ClubRole::Owner).await;
    let site_admin = ActorContext::site_admin(unique_user_id());

    for actor in [&owner, &site_admin] {
        assert!(!h
            .authz()
            .has_club_capability(actor, &club, Capabilities::empty())
            .await
            .unwrap());
        let err = h
            .authz()
            .require_club_capability(actor, &club, Capabilities::empty())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INSUFFICIENT_PRIVILEGES");
    }
}

#[tokio::test]
async fn test_owner_role_is_never_assignable() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let owner = h.member(&club, ClubRole::Owner).await;
    let rider = h.member(&club, ClubRole::Admin).await;

    let err = h
        .memberships()
        .update_member_role(&owner, &club, &rider.user_id, UpdateMemberRoleRequest::new(ClubRole::Owner))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ROLE_ASSIGNMENT_DENIED");
    assert_eq!(
        h.stored_membership(&club, &rider.user_id).await.unwrap().role,
        ClubRole::Admin
    );
}

// ============================================================================
// Moderation
// ============================================================================

#[tokio::test]
async fn test_suspend_reinstate_remove() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let admin = h.member(&club, ClubRole::Admin).await;
    let rider = h.member(&club, ClubRole::Member).await;

    let suspended = h
        .memberships()
        .suspend_member(&admin, &club, &rider.user_id, MemberActionRequest::with_reason("No-show x3"))
        .await
        .unwrap();
    assert_eq!(suspended.status, MembershipStatus::Suspended);

    // Suspended members lose their capabilities
    let caps = h.authz().effective_capabilities(&rider, &club).await.unwrap();
    assert!(caps.role.is_none());
    assert!(caps.capabilities.is_empty());

    let err = h
        .memberships()
        .suspend_member(&admin, &club, &rider.user_id, MemberActionRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_STATUS_TRANSITION");

    let reinstated = h
        .memberships()
        .reinstate_member(&admin, &club, &rider.user_id, MemberActionRequest::default())
        .await
        .unwrap();
    assert_eq!(reinstated.status, MembershipStatus::Active);

    let removed = h
        .memberships()
        .remove_member(&admin, &club, &rider.user_id, MemberActionRequest::with_reason("Left the area"))
        .await
        .unwrap();
    assert_eq!(removed.status, MembershipStatus::Removed);

    let err = h
        .memberships()
        .reinstate_member(&admin, &club, &rider.user_id, MemberActionRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_STATUS_TRANSITION");
}

#[tokio::test]
async fn test_owner_cannot_be_removed() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let admin = h.member(&club, ClubRole::Admin).await;
    let owner = h.member(&club, ClubRole::Owner).await;

    let err = h
        .memberships()
        .remove_member(&admin, &club, &owner.user_id, MemberActionRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "CANNOT_MANAGE_MEMBER");

    // Not even the platform override removes an owner
    let site_admin = club_core::ActorContext::site_admin("platform-admin");
    let err = h
        .memberships()
        .remove_member(&site_admin, &club, &owner.user_id, MemberActionRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ROLE_ASSIGNMENT_DENIED");
    assert!(h.stored_membership(&club, &owner.user_id).await.unwrap().is_active());
}

#[tokio::test]
async fn test_admins_cannot_remove_each_other() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let admin = h.member(&club, ClubRole::Admin).await;
    let other_admin = h.member(&club, ClubRole::Admin).await;
    let owner = h.member(&club, ClubRole::Owner).await;

    let err = h
        .memberships()
        .remove_member(&admin, &club, &other_admin.user_id, MemberActionRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "ROLE_ASSIGNMENT_DENIED");

    let removed = h
        .memberships()
        .remove_member(&owner, &club, &other_admin.user_id, MemberActionRequest::default())
        .await
        .unwrap();
    assert_eq!(removed.status, MembershipStatus::Removed);
}

// ============================================================================
// Queries
// ============================================================================

#[tokio::test]
async fn test_list_members_pages_and_enriches() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let owner = h.member(&club, ClubRole::Owner).await;
    for _ in 0..4 {
        h.member(&club, ClubRole::Member).await;
    }

    let first = h
        .memberships()
        .list_club_members(
            &owner,
            &club,
            ListMembersQuery {
                limit: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(first.items.len(), 3);
    assert!(first.has_more);
    assert!(first.items.iter().all(|m| m.user.is_some()));

    let second = h
        .memberships()
        .list_club_members(
            &owner,
            &club,
            ListMembersQuery {
                cursor: first.next_cursor.clone(),
                limit: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(second.items.len(), 2);
    assert!(!second.has_more);

    let bad_cursor = h
        .memberships()
        .list_club_members(
            &owner,
            &club,
            ListMembersQuery {
                cursor: Some("not-a-cursor".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(bad_cursor.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_outsiders_cannot_list_members() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    h.member(&club, ClubRole::Owner).await;
    let outsider = h.user();

    let err = h
        .memberships()
        .list_club_members(&outsider, &club, ListMembersQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INSUFFICIENT_PRIVILEGES");

    let own = h
        .memberships()
        .get_membership(&outsider, &club, &outsider.user_id)
        .await
        .unwrap_err();
    assert_eq!(own.error_code(), "UNKNOWN_MEMBERSHIP");
}

#[tokio::test]
async fn test_events_are_audited() {
    let h = TestHarness::new();
    let club = h.club(JoinPolicy::Open);
    let rider = h.user();

    h.memberships()
        .join_club(&rider, &club, JoinClubRequest::default())
        .await
        .unwrap();
    h.memberships()
        .join_club(&rider, &club, JoinClubRequest::default())
        .await
        .unwrap_err();

    let events: Vec<_> = h
        .audit
        .events()
        .into_iter()
        .filter(|e| e.operation == "join_club")
        .collect();
    assert_eq!(events.len(), 2);
    assert!(events[0].outcome.is_success());
    assert!(matches!(
        events[1].outcome,
        AuditOutcome::Failure { code: "ALREADY_MEMBER", .. }
    ));
}

#[tokio::test]
async fn test_unknown_club_is_audited_with_club_id() {
    let h = TestHarness::new();
    let rider = h.user();
    let missing = ClubId::from("does-not-exist");

    h.memberships()
        .join_club(&rider, &missing, JoinClubRequest::default())
        .await
        .unwrap_err();
    assert_eq!(h.audit.last("join_club").unwrap().club_id, Some(missing));
}
