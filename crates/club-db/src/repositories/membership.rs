//! Item-store implementation of MembershipRepository
//!
//! Each membership is written as three items in one batch: the canonical
//! record under the club partition, a by-user index item and a by-club-role
//! index item. All three carry the full record.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

use club_core::entities::Membership;
use club_core::error::DomainError;
use club_core::traits::{MembershipFilter, MembershipRepository, Page, RepoResult};
use club_core::value_objects::{ClubId, MembershipStatus, UserId};

use crate::keys;
use crate::mappers::{from_payload, to_payload};
use crate::models::MembershipRecord;
use crate::store::{Condition, Item, ItemStore, WriteOp};

use super::error::{map_condition_failure, map_store_error};
use super::pagination::{collect_all, collect_page};

// Batch position of the canonical item in every membership write
const CANONICAL: usize = 0;

/// Membership repository over a single-table item store
#[derive(Clone)]
pub struct KvMembershipRepository {
    store: Arc<dyn ItemStore>,
}

impl KvMembershipRepository {
    /// Create a new KvMembershipRepository
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    fn decode(item: &Item) -> RepoResult<Membership> {
        let record: MembershipRecord = from_payload(item.data.clone())?;
        Ok(record.into())
    }

    /// Canonical, by-user and by-role items for `membership`, canonical first
    fn items_for(membership: &Membership) -> RepoResult<[Item; 3]> {
        let payload = to_payload(&MembershipRecord::from(membership))?;
        Ok([
            Item::new(
                keys::membership_key(&membership.club_id, &membership.user_id),
                payload.clone(),
            ),
            Item::new(
                keys::membership_user_index_key(&membership.club_id, &membership.user_id),
                payload.clone(),
            ),
            Item::new(
                keys::membership_role_index_key(
                    &membership.club_id,
                    membership.role,
                    &membership.user_id,
                ),
                payload,
            ),
        ])
    }

    fn ensure_same_identity(previous: &Membership, updated: &Membership) -> RepoResult<()> {
        if previous.club_id != updated.club_id || previous.user_id != updated.user_id {
            return Err(DomainError::validation(
                "updated membership does not match the stored membership",
            ));
        }
        Ok(())
    }

    /// Stored record still has the status and role `previous` was read with
    fn unchanged(previous: &Membership) -> Condition {
        Condition::All(vec![
            Condition::attribute_equals("status", previous.status.as_str()),
            Condition::attribute_equals("role", previous.role.as_str()),
        ])
    }

    fn concurrent(membership: &Membership) -> DomainError {
        DomainError::ConcurrentModification(format!(
            "membership of user {} in club {}",
            membership.user_id, membership.club_id
        ))
    }
}

pub(crate) fn already_member(membership: &Membership) -> DomainError {
    DomainError::AlreadyMember {
        club_id: membership.club_id.clone(),
        user_id: membership.user_id.clone(),
    }
}

/// Batch that creates `membership`, canonical item first.
///
/// A removed record may be replaced; anything else stored under the key
/// fails the canonical condition. Shared with invitation acceptance so the
/// membership and the invitation land in one batch.
pub(crate) async fn create_ops(
    store: &dyn ItemStore,
    membership: &Membership,
) -> RepoResult<Vec<WriteOp>> {
    let existing = store
        .get(&keys::membership_key(&membership.club_id, &membership.user_id))
        .await
        .map_err(map_store_error)?
        .as_ref()
        .map(KvMembershipRepository::decode)
        .transpose()?;

    let canonical_condition = match &existing {
        None => Condition::NotExists,
        Some(prev) if prev.status == MembershipStatus::Removed => {
            Condition::attribute_equals("status", MembershipStatus::Removed.as_str())
        }
        Some(_) => return Err(already_member(membership)),
    };

    let [canonical, by_user, by_role] = KvMembershipRepository::items_for(membership)?;
    let mut ops = vec![
        WriteOp::put_if(canonical, canonical_condition),
        WriteOp::put(by_user),
        WriteOp::put(by_role),
    ];
    if let Some(prev) = existing.as_ref().filter(|prev| prev.role != membership.role) {
        ops.push(WriteOp::delete(keys::membership_role_index_key(
            &prev.club_id,
            prev.role,
            &prev.user_id,
        )));
    }
    Ok(ops)
}

#[async_trait]
impl MembershipRepository for KvMembershipRepository {
    #[instrument(skip(self))]
    async fn find(&self, club_id: &ClubId, user_id: &UserId) -> RepoResult<Option<Membership>> {
        let item = self
            .store
            .get(&keys::membership_key(club_id, user_id))
            .await
            .map_err(map_store_error)?;
        item.as_ref().map(Self::decode).transpose()
    }

    #[instrument(skip(self))]
    async fn list_by_club(
        &self,
        club_id: &ClubId,
        filter: MembershipFilter,
        cursor: Option<&str>,
        limit: usize,
    ) -> RepoResult<Page<Membership>> {
        // A role filter reads the role index partition instead of the club partition
        let pk = match filter.role {
            Some(role) => keys::club_role_pk(club_id, role),
            None => keys::club_pk(club_id),
        };

        collect_page(
            self.store.as_ref(),
            &pk,
            keys::MEMBER_PREFIX,
            cursor,
            limit,
            |item| {
                let membership = Self::decode(item)?;
                Ok(filter.matches(&membership).then_some(membership))
            },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_by_user(
        &self,
        user_id: &UserId,
        filter: MembershipFilter,
    ) -> RepoResult<Vec<Membership>> {
        let items = collect_all(
            self.store.as_ref(),
            &keys::user_pk(user_id),
            keys::MEMBERSHIP_PREFIX,
        )
        .await?;

        let mut memberships = Vec::with_capacity(items.len());
        for item in &items {
            let membership = Self::decode(item)?;
            if filter.matches(&membership) {
                memberships.push(membership);
            }
        }
        Ok(memberships)
    }

    #[instrument(skip(self, membership), fields(club_id = %membership.club_id, user_id = %membership.user_id))]
    async fn create(&self, membership: &Membership) -> RepoResult<()> {
        let ops = create_ops(self.store.as_ref(), membership).await?;
        self.store
            .transact_write(ops)
            .await
            .map_err(|e| map_condition_failure(e, |_| already_member(membership)))?;

        tracing::debug!(role = %membership.role, status = %membership.status, "Membership stored");
        Ok(())
    }

    #[instrument(skip(self, previous, updated), fields(club_id = %updated.club_id, user_id = %updated.user_id, status = %updated.status))]
    async fn update_status(&self, previous: &Membership, updated: &Membership) -> RepoResult<()> {
        Self::ensure_same_identity(previous, updated)?;
        if previous.role != updated.role {
            return Err(DomainError::validation(
                "status update must not change the member's role",
            ));
        }

        let [canonical, by_user, by_role] = Self::items_for(updated)?;
        let ops = vec![
            WriteOp::put_if(canonical, Self::unchanged(previous)),
            WriteOp::put(by_user),
            WriteOp::put(by_role),
        ];

        self.store
            .transact_write(ops)
            .await
            .map_err(|e| map_condition_failure(e, |_| Self::concurrent(updated)))
    }

    #[instrument(skip(self, previous, updated), fields(club_id = %updated.club_id, user_id = %updated.user_id, role = %updated.role))]
    async fn update_role(&self, previous: &Membership, updated: &Membership) -> RepoResult<()> {
        Self::ensure_same_identity(previous, updated)?;

        let [canonical, by_user, by_role] = Self::items_for(updated)?;
        let mut ops = vec![
            WriteOp::put_if(canonical, Self::unchanged(previous)),
            WriteOp::put(by_user),
            WriteOp::put(by_role),
        ];
        if previous.role != updated.role {
            ops.push(WriteOp::delete(keys::membership_role_index_key(
                &previous.club_id,
                previous.role,
                &previous.user_id,
            )));
        }

        self.store.transact_write(ops).await.map_err(|e| {
            map_condition_failure(e, |index| {
                if index == CANONICAL {
                    Self::concurrent(updated)
                } else {
                    DomainError::Storage(format!("unexpected condition failure at {index}"))
                }
            })
        })
    }
}
