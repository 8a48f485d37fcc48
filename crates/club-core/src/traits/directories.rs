//! External collaborator lookups
//!
//! Club metadata and user profiles are owned elsewhere; the membership core
//! only reads them through these traits.

use async_trait::async_trait;

use crate::entities::{Club, User};
use crate::value_objects::{ClubId, UserId};

use super::repositories::RepoResult;

#[async_trait]
pub trait ClubDirectory: Send + Sync {
    /// Look up a club by id
    async fn get_club_by_id(&self, id: &ClubId) -> RepoResult<Option<Club>>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up a user by id
    async fn get_user_by_id(&self, id: &UserId) -> RepoResult<Option<User>>;
}
