//! Item-store implementation of InvitationRepository
//!
//! An invitation is written as its canonical item plus a club index item, an
//! invitee index item (by user id or by email), a token index item for email
//! invitations, and while pending a guard item that makes "one pending
//! invitation per invitee per club" a write condition.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;

use club_core::entities::{Invitation, InviteeKey, Membership};
use club_core::error::DomainError;
use club_core::traits::{InvitationFilter, InvitationRepository, Page, RepoResult};
use club_core::value_objects::{ClubId, InvitationId, InvitationStatus, UserId};

use crate::keys;
use crate::mappers::{from_payload, to_payload};
use crate::models::{InvitationGuardRecord, InvitationRecord, INVITATION_GUARD_ENTITY};
use crate::store::{Condition, Item, ItemKey, ItemStore, WriteOp};

use super::error::{map_condition_failure, map_store_error};
use super::membership::{already_member, create_ops as membership_create_ops};
use super::pagination::{collect_all, collect_page};

// Batch positions used by `create`
const GUARD: usize = 0;
const CANONICAL: usize = 1;

/// Invitation repository over a single-table item store
#[derive(Clone)]
pub struct KvInvitationRepository {
    store: Arc<dyn ItemStore>,
}

impl KvInvitationRepository {
    /// Create a new KvInvitationRepository
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    fn decode(item: &Item) -> RepoResult<Invitation> {
        let record: InvitationRecord = from_payload(item.data.clone())?;
        Invitation::try_from(record)
    }

    async fn get_invitation(&self, key: &ItemKey) -> RepoResult<Option<Invitation>> {
        let item = self.store.get(key).await.map_err(map_store_error)?;
        item.as_ref().map(Self::decode).transpose()
    }

    /// Canonical item first, then every index item for the invitation's current state
    fn items_for(invitation: &Invitation) -> RepoResult<Vec<Item>> {
        let payload = to_payload(&InvitationRecord::from(invitation))?;
        let id = &invitation.id;
        let at = invitation.invited_at;

        let mut items = vec![
            Item::new(keys::invitation_key(id), payload.clone()),
            Item::new(
                keys::invitation_club_index_key(&invitation.club_id, at, id),
                payload.clone(),
            ),
        ];
        if let Some(email) = invitation.email() {
            items.push(Item::new(
                keys::invitation_email_index_key(email, at, id),
                payload.clone(),
            ));
        }
        if let Some(user_id) = invitation.user_id() {
            items.push(Item::new(
                keys::invitation_user_index_key(user_id, at, id),
                payload.clone(),
            ));
        }
        if let Some(token) = invitation.token() {
            items.push(Item::new(keys::invitation_token_key(token), payload));
        }
        Ok(items)
    }

    fn concurrent(invitation: &Invitation) -> DomainError {
        DomainError::ConcurrentModification(format!("invitation {}", invitation.id))
    }

    /// Status transition batch, canonical item first and guarded by the
    /// status `previous` was read with
    fn transition_ops(previous: &Invitation, updated: &Invitation) -> RepoResult<Vec<WriteOp>> {
        if previous.id != updated.id {
            return Err(DomainError::validation(
                "updated invitation does not match the stored invitation",
            ));
        }

        let mut items = Self::items_for(updated)?.into_iter();
        let mut ops = Vec::with_capacity(6);
        if let Some(canonical) = items.next() {
            ops.push(WriteOp::put_if(
                canonical,
                Condition::attribute_equals("status", previous.status.as_str()),
            ));
        }
        ops.extend(items.map(WriteOp::put));

        // Leaving pending releases the invitee for a new invitation
        if previous.is_pending() && !updated.is_pending() {
            ops.push(WriteOp::delete(keys::pending_invitation_guard_key(
                &previous.club_id,
                &previous.invitee_key(),
            )));
        }
        Ok(ops)
    }

    fn guard_item(invitation: &Invitation) -> RepoResult<Item> {
        let guard = InvitationGuardRecord {
            entity_type: INVITATION_GUARD_ENTITY.to_string(),
            invitation_id: invitation.id.clone(),
            created_at: Utc::now(),
        };
        Ok(Item::new(
            keys::pending_invitation_guard_key(&invitation.club_id, &invitation.invitee_key()),
            to_payload(&guard)?,
        ))
    }
}

#[async_trait]
impl InvitationRepository for KvInvitationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &InvitationId) -> RepoResult<Option<Invitation>> {
        self.get_invitation(&keys::invitation_key(id)).await
    }

    #[instrument(skip(self, token))]
    async fn find_by_token(&self, token: &str) -> RepoResult<Option<Invitation>> {
        self.get_invitation(&keys::invitation_token_key(token)).await
    }

    #[instrument(skip(self))]
    async fn find_pending_for(
        &self,
        club_id: &ClubId,
        invitee: &InviteeKey,
    ) -> RepoResult<Option<Invitation>> {
        let guard = self
            .store
            .get(&keys::pending_invitation_guard_key(club_id, invitee))
            .await
            .map_err(map_store_error)?;
        let Some(guard) = guard else {
            return Ok(None);
        };

        let guard: InvitationGuardRecord = from_payload(guard.data)?;
        let invitation = self.find_by_id(&guard.invitation_id).await?;
        Ok(invitation.filter(Invitation::is_pending))
    }

    #[instrument(skip(self))]
    async fn has_pending_invitation(
        &self,
        club_id: &ClubId,
        invitee: &InviteeKey,
    ) -> RepoResult<bool> {
        // The guard outlives the expiry time until someone persists the expiry
        let pending = self.find_pending_for(club_id, invitee).await?;
        Ok(pending.is_some_and(|invitation| !invitation.is_expired()))
    }

    #[instrument(skip(self))]
    async fn list_by_club(
        &self,
        club_id: &ClubId,
        filter: InvitationFilter,
        cursor: Option<&str>,
        limit: usize,
    ) -> RepoResult<Page<Invitation>> {
        collect_page(
            self.store.as_ref(),
            &keys::club_pk(club_id),
            keys::INVITATION_PREFIX,
            cursor,
            limit,
            |item| {
                let invitation = Self::decode(item)?;
                Ok(filter.matches(&invitation).then_some(invitation))
            },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_by_user(
        &self,
        user_id: &UserId,
        email: Option<&str>,
        filter: InvitationFilter,
    ) -> RepoResult<Vec<Invitation>> {
        let mut items = collect_all(
            self.store.as_ref(),
            &keys::user_pk(user_id),
            keys::INVITATION_PREFIX,
        )
        .await?;
        if let Some(email) = email {
            let email = InviteeKey::email(email);
            if let InviteeKey::Email(normalized) = &email {
                items.extend(
                    collect_all(
                        self.store.as_ref(),
                        &keys::email_pk(normalized),
                        keys::INVITATION_PREFIX,
                    )
                    .await?,
                );
            }
        }

        // An accepted email invitation is indexed under both partitions
        let mut seen = HashSet::new();
        let mut invitations = Vec::with_capacity(items.len());
        for item in &items {
            let invitation = Self::decode(item)?;
            if seen.insert(invitation.id.clone()) && filter.matches(&invitation) {
                invitations.push(invitation);
            }
        }
        invitations.sort_by(|a, b| a.invited_at.cmp(&b.invited_at).then_with(|| a.id.cmp(&b.id)));
        Ok(invitations)
    }

    #[instrument(skip(self, invitation), fields(invitation_id = %invitation.id, club_id = %invitation.club_id))]
    async fn create(&self, invitation: &Invitation) -> RepoResult<()> {
        if !invitation.is_pending() {
            return Err(DomainError::validation("only pending invitations can be created"));
        }

        let mut items = Self::items_for(invitation)?.into_iter();
        let mut ops = vec![WriteOp::put_if(Self::guard_item(invitation)?, Condition::NotExists)];
        if let Some(canonical) = items.next() {
            ops.push(WriteOp::put_if(canonical, Condition::NotExists));
        }
        ops.extend(items.map(WriteOp::put));

        self.store.transact_write(ops).await.map_err(|e| {
            map_condition_failure(e, |index| match index {
                GUARD => DomainError::UserAlreadyInvited {
                    club_id: invitation.club_id.clone(),
                    target: invitation.invitee_key().to_string(),
                },
                CANONICAL => DomainError::AlreadyExists(format!("invitation {}", invitation.id)),
                _ => DomainError::Storage(format!("unexpected condition failure at {index}")),
            })
        })?;

        tracing::debug!(kind = %invitation.invitation_type(), "Invitation stored");
        Ok(())
    }

    #[instrument(skip(self, previous, updated), fields(invitation_id = %updated.id, status = %updated.status))]
    async fn update_status(&self, previous: &Invitation, updated: &Invitation) -> RepoResult<()> {
        let ops = Self::transition_ops(previous, updated)?;
        self.store
            .transact_write(ops)
            .await
            .map_err(|e| map_condition_failure(e, |_| Self::concurrent(updated)))
    }

    #[instrument(skip(self, previous, accepted, membership), fields(invitation_id = %accepted.id, club_id = %accepted.club_id))]
    async fn accept(
        &self,
        previous: &Invitation,
        accepted: &Invitation,
        membership: &Membership,
    ) -> RepoResult<()> {
        if accepted.status != InvitationStatus::Accepted {
            return Err(DomainError::validation("acceptance must persist an accepted invitation"));
        }
        if membership.club_id != accepted.club_id {
            return Err(DomainError::validation(
                "membership does not belong to the invitation's club",
            ));
        }

        // Membership operations first; their canonical item sits at index 0
        let mut ops = membership_create_ops(self.store.as_ref(), membership).await?;
        let invitation_start = ops.len();
        ops.extend(Self::transition_ops(previous, accepted)?);

        self.store.transact_write(ops).await.map_err(|e| {
            map_condition_failure(e, |index| {
                if index < invitation_start {
                    already_member(membership)
                } else {
                    Self::concurrent(accepted)
                }
            })
        })?;

        tracing::debug!(user_id = %membership.user_id, role = %membership.role, "Invitation accepted");
        Ok(())
    }
}
