//! Actor context - the already-authenticated caller of a workflow

use crate::value_objects::{SystemCapabilities, SystemRole, UserId};

/// Authenticated caller as supplied by the transport layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    pub user_id: UserId,
    pub system_role: SystemRole,
    pub is_site_admin: bool,
}

impl ActorContext {
    /// A regular platform user
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            system_role: SystemRole::User,
            is_site_admin: false,
        }
    }

    /// A platform administrator
    pub fn site_admin(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            system_role: SystemRole::SiteAdmin,
            is_site_admin: true,
        }
    }

    /// Platform capabilities derived from the system role and the admin flag
    #[inline]
    pub fn system_capabilities(&self) -> SystemCapabilities {
        SystemCapabilities::derive(self.system_role, self.is_site_admin)
    }
}
