//! Authorization engine
//!
//! Resolves an actor's effective capabilities in a club and exposes the
//! has/require/can-manage checks used by every mutating workflow.
//!
//! Platform capabilities go through the TTL-bounded capability cache. Club
//! role and status are read from the membership repository on every call.

use club_core::value_objects::{can_manage, capabilities_for, check_role_assignment};
use club_core::{
    ActorContext, Capabilities, ClubId, ClubRole, DomainError, Membership, SystemCapabilities,
};
use tracing::{debug, instrument, warn};

use crate::dto::EffectiveCapabilitiesResponse;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Authorization service for club-level access control
pub struct AuthorizationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthorizationService<'a> {
    /// Create a new AuthorizationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Platform capabilities of the actor, served from cache when fresh
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn system_capabilities(&self, actor: &ActorContext) -> SystemCapabilities {
        let cache = self.ctx.capability_cache();
        if let Some(cached) = cache.get(&actor.user_id).await {
            return cached;
        }

        let derived = actor.system_capabilities();
        cache.set(&actor.user_id, derived).await;
        debug!(capabilities = ?derived, "System capabilities derived");
        derived
    }

    /// Whether the actor holds the platform override
    pub async fn has_system_override(&self, actor: &ActorContext) -> bool {
        self.system_capabilities(actor).await.has_override()
    }

    /// The actor's membership in the club, counted only while active
    async fn active_membership(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
    ) -> ServiceResult<Option<Membership>> {
        let membership = self
            .ctx
            .membership_repo()
            .find(club_id, &actor.user_id)
            .await?;
        Ok(membership.filter(Membership::is_active))
    }

    /// Role the actor currently holds in the club, if actively a member
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn club_role(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
    ) -> ServiceResult<Option<ClubRole>> {
        Ok(self
            .active_membership(actor, club_id)
            .await?
            .map(|m| m.role))
    }

    /// Club capabilities granted by the actor's current role
    pub async fn club_capabilities(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
    ) -> ServiceResult<Capabilities> {
        let role = self.club_role(actor, club_id).await?;
        Ok(role.map_or_else(Capabilities::empty, capabilities_for))
    }

    /// Check a club capability without failing
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn has_club_capability(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        capability: Capabilities,
    ) -> ServiceResult<bool> {
        // An empty requirement names nothing to grant
        if capability.is_empty() {
            return Ok(false);
        }
        if self.has_system_override(actor).await {
            debug!(club_id = %club_id, "System override grants capability");
            return Ok(true);
        }
        Ok(self
            .club_capabilities(actor, club_id)
            .await?
            .contains(capability))
    }

    /// Check a club capability and return error if denied
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn require_club_capability(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        capability: Capabilities,
    ) -> ServiceResult<()> {
        if self.has_club_capability(actor, club_id, capability).await? {
            return Ok(());
        }

        let capability = capability.describe();
        warn!(
            actor_id = %actor.user_id,
            club_id = %club_id,
            capability = %capability,
            "Club capability denied"
        );
        Err(DomainError::InsufficientPrivileges {
            actor_id: actor.user_id.clone(),
            club_id: club_id.clone(),
            capability,
        }
        .into())
    }

    /// Whether the actor may manage a member holding `target_role`
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn can_manage_member(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        target_role: ClubRole,
    ) -> ServiceResult<bool> {
        if self.has_system_override(actor).await {
            return Ok(true);
        }
        let role = self.club_role(actor, club_id).await?;
        Ok(role.is_some_and(|role| can_manage(role, target_role)))
    }

    /// Like [`Self::can_manage_member`] but fails with the denial context
    pub async fn require_can_manage_member(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        target_role: ClubRole,
    ) -> ServiceResult<()> {
        if self.can_manage_member(actor, club_id, target_role).await? {
            return Ok(());
        }
        warn!(
            actor_id = %actor.user_id,
            club_id = %club_id,
            target_role = %target_role,
            "Member management denied"
        );
        Err(DomainError::CannotManageMember {
            actor_id: actor.user_id.clone(),
            club_id: club_id.clone(),
            target_role,
        }
        .into())
    }

    /// Check that the actor may hand out `target_role` in the club.
    ///
    /// The platform override assigns as an owner would, so owner is still
    /// never assignable.
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn validate_role_assignment(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
        target_role: ClubRole,
    ) -> ServiceResult<()> {
        let acting_role = if self.has_system_override(actor).await {
            Some(ClubRole::Owner)
        } else {
            self.club_role(actor, club_id).await?
        };

        // Non-members assign nothing; the member rules deny every target
        let denial = check_role_assignment(acting_role.unwrap_or(ClubRole::Member), target_role).err();

        match denial {
            None => Ok(()),
            Some(denial) => {
                warn!(
                    actor_id = %actor.user_id,
                    club_id = %club_id,
                    target_role = %target_role,
                    reason = denial.message(),
                    "Role assignment denied"
                );
                Err(DomainError::RoleAssignmentDenied {
                    actor_id: actor.user_id.clone(),
                    club_id: club_id.clone(),
                    target_role,
                    reason: denial.message(),
                }
                .into())
            }
        }
    }

    /// Role and capability tokens the actor holds in a club
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn effective_capabilities(
        &self,
        actor: &ActorContext,
        club_id: &ClubId,
    ) -> ServiceResult<EffectiveCapabilitiesResponse> {
        let system = self.system_capabilities(actor).await;
        let role = self.club_role(actor, club_id).await?;
        let capabilities = if system.has_override() {
            Capabilities::all()
        } else {
            role.map_or_else(Capabilities::empty, capabilities_for)
        };

        Ok(EffectiveCapabilitiesResponse {
            club_id: club_id.to_string(),
            role,
            capabilities: capabilities.tokens(),
            system_override: system.has_override(),
        })
    }
}
