//! Membership service
//!
//! Handles join requests, departures, role changes and member moderation.

use futures::future::try_join_all;
use tracing::{info, instrument};
use validator::Validate;

use club_core::{
    ActorContext, Capabilities, Club, ClubId, DomainError, Membership, MembershipFilter,
    MembershipStatus, NewMembership, UserId,
};

use crate::dto::{
    JoinClubRequest, JoinRequestAction, ListMembersQuery, MemberActionRequest,
    MemberWithUserResponse, MembershipResponse, PageResponse, ProcessJoinRequest,
    UpdateMemberRoleRequest, UserSummary,
};

use super::audit::audited;
use super::authorization::AuthorizationService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Reason recorded when a member leaves on their own
pub const VOLUNTARY_DEPARTURE: &str = "voluntary departure";

const JOIN_REQUEST_APPROVED: &str = "join request approved";
const JOIN_REQUEST_REJECTED: &str = "join request rejected";

/// Membership service
pub struct MembershipService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MembershipService<'a> {
    /// Create a new MembershipService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn authz(&self) -> AuthorizationService<'a> {
        AuthorizationService::new(self.ctx)
    }

    /// Load a club that is still accepting members
    pub(crate) async fn active_club(ctx: &ServiceContext, club_id: &ClubId) -> ServiceResult<Club> {
        let club = ctx
            .club_directory()
            .get_club_by_id(club_id)
            .await?
            .ok_or_else(|| DomainError::ClubNotFound(club_id.clone()))?;
        if !club.is_active {
            return Err(DomainError::validation("club is not active").into());
        }
        Ok(club)
    }

    async fn load(&self, club_id: &ClubId, user_id: &UserId) -> ServiceResult<Membership> {
        Ok(self
            .ctx
            .membership_repo()
            .find(club_id, user_id)
            .await?
            .ok_or_else(|| DomainError::MembershipNotFound {
                club_id: club_id.clone(),
                user_id: user_id.clone(),
            })?)
    }

    /// Own-membership changes go through `leave_club`
    fn ensure_not_self(actor: &ActorContext, user_id: &UserId) -> ServiceResult<()> {
        if actor.user_id == *user_id {
            return Err(ServiceError::validation(
                "cannot manage your own membership",
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Join / leave
    // ========================================================================

    /// Request to join a club; open clubs activate immediately
    #[instrument(skip(self, actor, request), fields(actor_id = %actor.user_id))]
    pub async fn join_club(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        request: JoinClubRequest,
    ) -> ServiceResult<MembershipResponse> {
        audited(
            self.ctx.audit_sink(),
            "join_club",
            actor,
            Some(club_id),
            self.join(actor, club_id, request),
        )
        .await
    }

    async fn join(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        request: JoinClubRequest,
    ) -> ServiceResult<MembershipResponse> {
        request.validate()?;
        let club = Self::active_club(self.ctx, club_id).await?;

        if let Some(existing) = self
            .ctx
            .membership_repo()
            .find(club_id, &actor.user_id)
            .await?
        {
            if !existing.is_removed() {
                return Err(DomainError::AlreadyMember {
                    club_id: club_id.clone(),
                    user_id: actor.user_id.clone(),
                }
                .into());
            }
        }

        let membership = Membership::create(
            NewMembership::new(club_id.clone(), actor.user_id.clone())
                .with_status(club.join_policy.initial_status())
                .with_join_message(request.message),
        )?;
        self.ctx.membership_repo().create(&membership).await?;

        info!(
            club_id = %club_id,
            user_id = %actor.user_id,
            status = %membership.status,
            "Join request recorded"
        );
        Ok(MembershipResponse::from(&membership))
    }

    /// Leave a club voluntarily
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn leave_club(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
    ) -> ServiceResult<MembershipResponse> {
        audited(
            self.ctx.audit_sink(),
            "leave_club",
            actor,
            Some(club_id),
            self.leave(actor, club_id),
        )
        .await
    }

    async fn leave(&self, actor: &ActorContext, club_id: &ClubId) -> ServiceResult<MembershipResponse> {
        let membership = self.load(club_id, &actor.user_id).await?;
        if membership.is_owner() {
            return Err(DomainError::validation(
                "club owner cannot leave; transfer ownership first",
            )
            .into());
        }
        if !membership.can_leave() {
            return Err(DomainError::validation("only active members can leave a club").into());
        }

        let updated = membership.change_status(
            MembershipStatus::Removed,
            Some(&actor.user_id),
            Some(VOLUNTARY_DEPARTURE),
        )?;
        self.ctx
            .membership_repo()
            .update_status(&membership, &updated)
            .await?;

        info!(club_id = %club_id, user_id = %actor.user_id, "Member left club");
        Ok(MembershipResponse::from(&updated))
    }

    // ========================================================================
    // Join requests
    // ========================================================================

    /// Approve or reject a pending join request
    #[instrument(skip(self, actor, request), fields(actor_id = %actor.user_id))]
    pub async fn process_join_request(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        user_id: &UserId,
        request: ProcessJoinRequest,
    ) -> ServiceResult<MembershipResponse> {
        audited(
            self.ctx.audit_sink(),
            "process_join_request",
            actor,
            Some(club_id),
            self.process_join(actor, club_id, user_id, request),
        )
        .await
    }

    async fn process_join(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        user_id: &UserId,
        request: ProcessJoinRequest,
    ) -> ServiceResult<MembershipResponse> {
        self.authz()
            .require_club_capability(actor, club_id, Capabilities::MANAGE_JOIN_REQUESTS)
            .await?;
        request.validate()?;

        let membership = self.load(club_id, user_id).await?;
        if !membership.is_pending() {
            return Err(DomainError::validation(format!(
                "membership is {}, not pending",
                membership.status
            ))
            .into());
        }

        let (target, default_reason) = match request.action {
            JoinRequestAction::Approve => (MembershipStatus::Active, JOIN_REQUEST_APPROVED),
            JoinRequestAction::Reject => (MembershipStatus::Removed, JOIN_REQUEST_REJECTED),
        };
        let reason = request.reason.as_deref().unwrap_or(default_reason);
        let updated = membership.change_status(target, Some(&actor.user_id), Some(reason))?;
        self.ctx
            .membership_repo()
            .update_status(&membership, &updated)
            .await?;

        info!(
            club_id = %club_id,
            user_id = %user_id,
            processed_by = %actor.user_id,
            status = %updated.status,
            "Join request processed"
        );
        Ok(MembershipResponse::from(&updated))
    }

    // ========================================================================
    // Member management
    // ========================================================================

    /// Promote or demote a member
    #[instrument(skip(self, actor, request), fields(actor_id = %actor.user_id))]
    pub async fn update_member_role(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        user_id: &UserId,
        request: UpdateMemberRoleRequest,
    ) -> ServiceResult<MembershipResponse> {
        audited(
            self.ctx.audit_sink(),
            "update_member_role",
            actor,
            Some(club_id),
            self.update_role(actor, club_id, user_id, request),
        )
        .await
    }

    async fn update_role(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        user_id: &UserId,
        request: UpdateMemberRoleRequest,
    ) -> ServiceResult<MembershipResponse> {
        Self::ensure_not_self(actor, user_id)?;
        request.validate()?;

        let authz = self.authz();
        authz
            .require_club_capability(actor, club_id, Capabilities::MANAGE_MEMBERS)
            .await?;
        let membership = self.load(club_id, user_id).await?;
        authz
            .require_can_manage_member(actor, club_id, membership.role)
            .await?;
        // Taking a role away needs the same right as handing it out
        authz
            .validate_role_assignment(actor, club_id, membership.role)
            .await?;
        authz
            .validate_role_assignment(actor, club_id, request.role)
            .await?;

        if !membership.is_active() {
            return Err(DomainError::validation("only active members can change role").into());
        }

        let updated = membership.update_role(request.role, &actor.user_id, request.reason.as_deref())?;
        self.ctx
            .membership_repo()
            .update_role(&membership, &updated)
            .await?;

        info!(
            club_id = %club_id,
            user_id = %user_id,
            from = %membership.role,
            to = %updated.role,
            "Member role updated"
        );
        Ok(MembershipResponse::from(&updated))
    }

    /// Remove a member from the club
    #[instrument(skip(self, actor, request), fields(actor_id = %actor.user_id))]
    pub async fn remove_member(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        user_id: &UserId,
        request: MemberActionRequest,
    ) -> ServiceResult<MembershipResponse> {
        audited(
            self.ctx.audit_sink(),
            "remove_member",
            actor,
            Some(club_id),
            self.moderate(actor, club_id, user_id, MembershipStatus::Removed, request),
        )
        .await
    }

    /// Suspend an active member
    #[instrument(skip(self, actor, request), fields(actor_id = %actor.user_id))]
    pub async fn suspend_member(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        user_id: &UserId,
        request: MemberActionRequest,
    ) -> ServiceResult<MembershipResponse> {
        audited(
            self.ctx.audit_sink(),
            "suspend_member",
            actor,
            Some(club_id),
            self.moderate(actor, club_id, user_id, MembershipStatus::Suspended, request),
        )
        .await
    }

    /// Reinstate a suspended member
    #[instrument(skip(self, actor, request), fields(actor_id = %actor.user_id))]
    pub async fn reinstate_member(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        user_id: &UserId,
        request: MemberActionRequest,
    ) -> ServiceResult<MembershipResponse> {
        audited(
            self.ctx.audit_sink(),
            "reinstate_member",
            actor,
            Some(club_id),
            self.moderate(actor, club_id, user_id, MembershipStatus::Active, request),
        )
        .await
    }

    async fn moderate(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        user_id: &UserId,
        target: MembershipStatus,
        request: MemberActionRequest,
    ) -> ServiceResult<MembershipResponse> {
        Self::ensure_not_self(actor, user_id)?;
        request.validate()?;

        let authz = self.authz();
        authz
            .require_club_capability(actor, club_id, Capabilities::MANAGE_MEMBERS)
            .await?;
        let membership = self.load(club_id, user_id).await?;
        authz
            .require_can_manage_member(actor, club_id, membership.role)
            .await?;
        authz
            .validate_role_assignment(actor, club_id, membership.role)
            .await?;

        let expected = match target {
            MembershipStatus::Suspended => Some(MembershipStatus::Active),
            MembershipStatus::Active => Some(MembershipStatus::Suspended),
            _ => None,
        };
        if let Some(expected) = expected {
            if membership.status != expected {
                return Err(DomainError::InvalidStatusTransition {
                    from: membership.status.as_str(),
                    to: target.as_str(),
                }
                .into());
            }
        }

        let updated =
            membership.change_status(target, Some(&actor.user_id), request.reason.as_deref())?;
        if updated.status != membership.status {
            self.ctx
                .membership_repo()
                .update_status(&membership, &updated)
                .await?;
        }

        info!(
            club_id = %club_id,
            user_id = %user_id,
            status = %updated.status,
            processed_by = %actor.user_id,
            "Member status changed"
        );
        Ok(MembershipResponse::from(&updated))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Get one membership; members may always read their own
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn get_membership(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        user_id: &UserId,
    ) -> ServiceResult<MembershipResponse> {
        if actor.user_id != *user_id {
            self.authz()
                .require_club_capability(actor, club_id, Capabilities::VIEW_MEMBERS)
                .await?;
        }
        let membership = self.load(club_id, user_id).await?;
        Ok(MembershipResponse::from(&membership))
    }

    /// List a club's members with profile details
    #[instrument(skip(self, actor, query), fields(actor_id = %actor.user_id))]
    pub async fn list_club_members(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        query: ListMembersQuery,
    ) -> ServiceResult<PageResponse<MemberWithUserResponse>> {
        self.authz()
            .require_club_capability(actor, club_id, Capabilities::VIEW_MEMBERS)
            .await?;
        query.validate()?;

        let filter = MembershipFilter {
            role: query.role,
            status: query.status,
        };
        let limit = self.ctx.pagination().clamp(query.limit);
        let page = self
            .ctx
            .membership_repo()
            .list_by_club(club_id, filter, query.cursor.as_deref(), limit)
            .await?;

        let users = try_join_all(
            page.items
                .iter()
                .map(|m| self.ctx.user_directory().get_user_by_id(&m.user_id)),
        )
        .await?;

        let items = page
            .items
            .iter()
            .zip(users)
            .map(|(membership, user)| MemberWithUserResponse {
                membership: MembershipResponse::from(membership),
                user: user.as_ref().map(UserSummary::from),
            })
            .collect();
        Ok(PageResponse::new(items, page.next_cursor))
    }

    /// The actor's own memberships across clubs
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn list_my_memberships(
        &self,
        actor: &ActorContext,
        status: Option<MembershipStatus>,
    ) -> ServiceResult<Vec<MembershipResponse>> {
        let filter = MembershipFilter { role: None, status };
        let memberships = self
            .ctx
            .membership_repo()
            .list_by_user(&actor.user_id, filter)
            .await?;
        Ok(memberships.iter().map(MembershipResponse::from).collect())
    }
}
