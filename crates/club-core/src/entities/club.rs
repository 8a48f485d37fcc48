//! Club entity - the subset of club metadata the membership core consumes

use serde::{Deserialize, Serialize};

use crate::value_objects::{ClubId, MembershipStatus};

/// How join requests are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinPolicy {
    /// Join requests become active immediately
    Open,
    /// Join requests wait for a manager's approval
    #[default]
    Approval,
}

impl JoinPolicy {
    /// Status a freshly requested membership starts in
    #[inline]
    pub fn initial_status(self) -> MembershipStatus {
        match self {
            Self::Open => MembershipStatus::Active,
            Self::Approval => MembershipStatus::Pending,
        }
    }
}

/// Club as returned by the club directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Club {
    pub id: ClubId,
    pub name: String,
    pub join_policy: JoinPolicy,
    pub is_active: bool,
}

impl Club {
    pub fn new(id: impl Into<ClubId>, name: impl Into<String>, join_policy: JoinPolicy) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            join_policy,
            is_active: true,
        }
    }
}
