//! Invitation service
//!
//! Handles sending, answering, cancelling and expiring club invitations.
//! Expiry is evaluated from the clock; a stale pending invitation is persisted
//! as expired whenever a workflow runs into it.

use tracing::{debug, info, instrument, warn};
use validator::Validate;

use club_core::{
    ActorContext, Capabilities, ClubId, DomainError, Invitation, InvitationAction,
    InvitationFilter, InvitationId, InvitationInput, InvitationStatus, InvitationType, InviteeKey,
    Membership, MembershipStatus, NewMembership, UserId,
};

use crate::dto::{
    ExpireInvitationsResponse, InvitationResponse, InviteByEmailRequest, InviteUserRequest,
    ListInvitationsQuery, MembershipResponse, PageResponse, ProcessInvitationRequest,
    ProcessInvitationResponse,
};

use super::audit::audited;
use super::authorization::AuthorizationService;
use super::context::ServiceContext;
use super::error::ServiceResult;
use super::membership::MembershipService;

/// Invitation service
pub struct InvitationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> InvitationService<'a> {
    /// Create a new InvitationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn authz(&self) -> AuthorizationService<'a> {
        AuthorizationService::new(self.ctx)
    }

    async fn load(&self, id: &InvitationId) -> ServiceResult<Invitation> {
        Ok(self
            .ctx
            .invitation_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::InvitationNotFound(id.to_string()))?)
    }

    /// Persist `expired` for a pending invitation whose time has passed.
    ///
    /// Returns whether this call wrote the transition; losing a race to
    /// another writer is not an error.
    async fn persist_expiry(&self, invitation: &Invitation) -> ServiceResult<bool> {
        let expired = invitation.expire()?;
        match self
            .ctx
            .invitation_repo()
            .update_status(invitation, &expired)
            .await
        {
            Ok(()) => {
                debug!(invitation_id = %invitation.id, "Invitation expired");
                Ok(true)
            }
            Err(e) if e.is_conflict() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Reject when the invitee already belongs to the club
    async fn ensure_not_member(&self, club_id: &ClubId, user_id: &UserId) -> ServiceResult<()> {
        let existing = self.ctx.membership_repo().find(club_id, user_id).await?;
        if existing.is_some_and(|m| !m.is_removed()) {
            return Err(DomainError::AlreadyMember {
                club_id: club_id.clone(),
                user_id: user_id.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Reject when the invitee already holds a live pending invitation
    async fn ensure_no_pending(&self, club_id: &ClubId, invitee: &InviteeKey) -> ServiceResult<()> {
        let pending = self
            .ctx
            .invitation_repo()
            .find_pending_for(club_id, invitee)
            .await?;
        match pending {
            Some(existing) if existing.is_expired() => {
                self.persist_expiry(&existing).await?;
                Ok(())
            }
            Some(_) => Err(DomainError::UserAlreadyInvited {
                club_id: club_id.clone(),
                target: invitee.to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }

    /// Only the addressee may answer: the invited user, or for email
    /// invitations a user whose profile email matches.
    async fn ensure_recipient(&self, actor: &ActorContext, invitation: &Invitation) -> ServiceResult<()> {
        let is_recipient = match invitation.invitation_type() {
            InvitationType::User => invitation.is_addressed_to(&actor.user_id),
            InvitationType::Email => {
                let user = self
                    .ctx
                    .user_directory()
                    .get_user_by_id(&actor.user_id)
                    .await?;
                match (user, invitation.email()) {
                    (Some(user), Some(email)) => user.has_email(email),
                    _ => false,
                }
            }
        };

        if !is_recipient {
            warn!(
                actor_id = %actor.user_id,
                invitation_id = %invitation.id,
                "Invitation answered by someone other than the recipient"
            );
            return Err(DomainError::NotInvitationRecipient.into());
        }
        Ok(())
    }

    // ========================================================================
    // Sending
    // ========================================================================

    /// Invite an existing user by id
    #[instrument(skip(self, actor, request), fields(actor_id = %actor.user_id))]
    pub async fn invite_user(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        request: InviteUserRequest,
    ) -> ServiceResult<InvitationResponse> {
        audited(
            self.ctx.audit_sink(),
            "invite_user",
            actor,
            Some(club_id),
            self.invite_by_id(actor, club_id, request),
        )
        .await
    }

    async fn invite_by_id(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        request: InviteUserRequest,
    ) -> ServiceResult<InvitationResponse> {
        let authz = self.authz();
        authz
            .require_club_capability(actor, club_id, Capabilities::INVITE_MEMBERS)
            .await?;
        request.validate()?;
        MembershipService::active_club(self.ctx, club_id).await?;
        authz
            .validate_role_assignment(actor, club_id, request.role)
            .await?;

        let invitee = UserId::new(request.user_id);
        if self
            .ctx
            .user_directory()
            .get_user_by_id(&invitee)
            .await?
            .is_none()
        {
            return Err(DomainError::UserNotFound(invitee).into());
        }
        self.ensure_not_member(club_id, &invitee).await?;
        self.ensure_no_pending(club_id, &InviteeKey::User(invitee.clone()))
            .await?;

        let invitation = Invitation::create(
            InvitationInput::for_user(invitee, request.role)
                .with_message(request.message)
                .with_expires_in_days(request.expires_in_days),
            club_id.clone(),
            actor.user_id.clone(),
        )?;
        self.ctx.invitation_repo().create(&invitation).await?;

        info!(
            invitation_id = %invitation.id,
            club_id = %club_id,
            role = %invitation.role,
            "User invited"
        );
        Ok(InvitationResponse::from(&invitation))
    }

    /// Invite someone by email; the response carries the delivery token
    #[instrument(skip(self, actor, request), fields(actor_id = %actor.user_id))]
    pub async fn invite_by_email(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        request: InviteByEmailRequest,
    ) -> ServiceResult<InvitationResponse> {
        audited(
            self.ctx.audit_sink(),
            "invite_by_email",
            actor,
            Some(club_id),
            self.invite_email(actor, club_id, request),
        )
        .await
    }

    async fn invite_email(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        request: InviteByEmailRequest,
    ) -> ServiceResult<InvitationResponse> {
        let authz = self.authz();
        authz
            .require_club_capability(actor, club_id, Capabilities::INVITE_MEMBERS)
            .await?;
        request.validate()?;
        MembershipService::active_club(self.ctx, club_id).await?;
        authz
            .validate_role_assignment(actor, club_id, request.role)
            .await?;

        self.ensure_no_pending(club_id, &InviteeKey::email(&request.email))
            .await?;

        let invitation = Invitation::create(
            InvitationInput::for_email(request.email, request.role)
                .with_message(request.message)
                .with_expires_in_days(request.expires_in_days),
            club_id.clone(),
            actor.user_id.clone(),
        )?;
        self.ctx.invitation_repo().create(&invitation).await?;

        info!(
            invitation_id = %invitation.id,
            club_id = %club_id,
            role = %invitation.role,
            "Email invitation created"
        );
        Ok(InvitationResponse::with_token(&invitation))
    }

    // ========================================================================
    // Answering
    // ========================================================================

    /// Accept or decline an invitation by id
    #[instrument(skip(self, actor, request), fields(actor_id = %actor.user_id))]
    pub async fn process_invitation(
        &self,
        actor: &ActorContext,
        invitation_id: &InvitationId,
        request: ProcessInvitationRequest,
    ) -> ServiceResult<ProcessInvitationResponse> {
        audited(
            self.ctx.audit_sink(),
            "process_invitation",
            actor,
            None,
            self.answer_by_id(actor, invitation_id, request.action),
        )
        .await
    }

    async fn answer_by_id(
        &self,
        actor: &ActorContext,
        invitation_id: &InvitationId,
        action: InvitationAction,
    ) -> ServiceResult<ProcessInvitationResponse> {
        let invitation = self.load(invitation_id).await?;
        self.answer(actor, invitation, action).await
    }

    /// Accept or decline an email invitation by its delivery token
    #[instrument(skip(self, actor, token, request), fields(actor_id = %actor.user_id))]
    pub async fn process_invitation_by_token(
        &self,
        actor: &ActorContext,
        token: &str,
        request: ProcessInvitationRequest,
    ) -> ServiceResult<ProcessInvitationResponse> {
        audited(
            self.ctx.audit_sink(),
            "process_invitation_by_token",
            actor,
            None,
            self.answer_by_token(actor, token, request.action),
        )
        .await
    }

    async fn answer_by_token(
        &self,
        actor: &ActorContext,
        token: &str,
        action: InvitationAction,
    ) -> ServiceResult<ProcessInvitationResponse> {
        let invitation = self
            .ctx
            .invitation_repo()
            .find_by_token(token)
            .await?
            .ok_or_else(|| DomainError::InvitationNotFound("token".to_string()))?;
        self.answer(actor, invitation, action).await
    }

    async fn answer(
        &self,
        actor: &ActorContext,
        invitation: Invitation,
        action: InvitationAction,
    ) -> ServiceResult<ProcessInvitationResponse> {
        self.ensure_recipient(actor, &invitation).await?;

        if invitation.is_pending() && invitation.is_expired() {
            self.persist_expiry(&invitation).await?;
            return Err(DomainError::InvitationExpired(invitation.id.clone()).into());
        }
        let processed = invitation.process(action, Some(&actor.user_id))?;

        // Acceptance writes the membership and the invitation in one batch
        let membership = match action {
            InvitationAction::Accept => {
                let club_id = &invitation.club_id;
                self.ensure_not_member(club_id, &actor.user_id).await?;
                let membership = Membership::create(
                    NewMembership::new(club_id.clone(), actor.user_id.clone())
                        .with_role(invitation.role)
                        .with_status(MembershipStatus::Active)
                        .with_invited_by(Some(invitation.invited_by.clone())),
                )?;
                self.ctx
                    .invitation_repo()
                    .accept(&invitation, &processed, &membership)
                    .await?;
                Some(membership)
            }
            InvitationAction::Decline => {
                self.ctx
                    .invitation_repo()
                    .update_status(&invitation, &processed)
                    .await?;
                None
            }
        };

        info!(
            invitation_id = %processed.id,
            club_id = %processed.club_id,
            user_id = %actor.user_id,
            status = %processed.status,
            "Invitation processed"
        );
        Ok(ProcessInvitationResponse {
            invitation: InvitationResponse::from(&processed),
            membership: membership.as_ref().map(MembershipResponse::from),
        })
    }

    // ========================================================================
    // Inviter-side management
    // ========================================================================

    /// Withdraw a pending invitation; the inviter or any inviting manager may cancel
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn cancel_invitation(
        &self,
        actor: &ActorContext,
        invitation_id: &InvitationId,
    ) -> ServiceResult<InvitationResponse> {
        audited(
            self.ctx.audit_sink(),
            "cancel_invitation",
            actor,
            None,
            self.cancel(actor, invitation_id),
        )
        .await
    }

    async fn cancel(
        &self,
        actor: &ActorContext,
        invitation_id: &InvitationId,
    ) -> ServiceResult<InvitationResponse> {
        let invitation = self.load(invitation_id).await?;
        if invitation.invited_by != actor.user_id {
            self.authz()
                .require_club_capability(actor, &invitation.club_id, Capabilities::INVITE_MEMBERS)
                .await?;
        }

        let cancelled = invitation.cancel()?;
        self.ctx
            .invitation_repo()
            .update_status(&invitation, &cancelled)
            .await?;

        info!(invitation_id = %cancelled.id, club_id = %cancelled.club_id, "Invitation cancelled");
        Ok(InvitationResponse::from(&cancelled))
    }

    /// Persist `expired` for every time-expired pending invitation of a club
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn expire_stale_invitations(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
    ) -> ServiceResult<ExpireInvitationsResponse> {
        audited(
            self.ctx.audit_sink(),
            "expire_stale_invitations",
            actor,
            Some(club_id),
            self.sweep(actor, club_id),
        )
        .await
    }

    async fn sweep(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
    ) -> ServiceResult<ExpireInvitationsResponse> {
        self.authz()
            .require_club_capability(actor, club_id, Capabilities::INVITE_MEMBERS)
            .await?;

        let filter = InvitationFilter::default().with_status(InvitationStatus::Pending);
        let limit = self.ctx.pagination().max_limit;
        let mut cursor: Option<String> = None;
        let mut expired = 0;
        loop {
            let page = self
                .ctx
                .invitation_repo()
                .list_by_club(club_id, filter, cursor.as_deref(), limit)
                .await?;
            for invitation in page.items.iter().filter(|i| i.is_expired()) {
                if self.persist_expiry(invitation).await? {
                    expired += 1;
                }
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        info!(club_id = %club_id, expired, "Stale invitations expired");
        Ok(ExpireInvitationsResponse { expired })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// List a club's invitations
    #[instrument(skip(self, actor, query), fields(actor_id = %actor.user_id))]
    pub async fn list_club_invitations(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        query: ListInvitationsQuery,
    ) -> ServiceResult<PageResponse<InvitationResponse>> {
        self.authz()
            .require_club_capability(actor, club_id, Capabilities::VIEW_INVITATIONS)
            .await?;
        query.validate()?;

        let filter = InvitationFilter {
            status: query.status,
        };
        let limit = self.ctx.pagination().clamp(query.limit);
        let page = self
            .ctx
            .invitation_repo()
            .list_by_club(club_id, filter, query.cursor.as_deref(), limit)
            .await?;

        let page = page.map(|invitation| InvitationResponse::from(&invitation));
        Ok(PageResponse::new(page.items, page.next_cursor))
    }

    /// Invitations addressed to the actor, by user id and by profile email
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn list_my_invitations(
        &self,
        actor: &ActorContext,
        status: Option<InvitationStatus>,
    ) -> ServiceResult<Vec<InvitationResponse>> {
        let user = self
            .ctx
            .user_directory()
            .get_user_by_id(&actor.user_id)
            .await?;
        let email = user.as_ref().and_then(|u| u.email.as_deref());

        let invitations = self
            .ctx
            .invitation_repo()
            .list_by_user(&actor.user_id, email, InvitationFilter { status })
            .await?;
        Ok(invitations.iter().map(InvitationResponse::from).collect())
    }
}
