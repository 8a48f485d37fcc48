//! Capability table for club roles and the platform role
//!
//! Each club role's capability set is a strict superset of the role below it.
//! Owners additionally hold `MANAGE_CLUB_SETTINGS` and `ASSIGN_ADMIN_ROLE`, which no
//! other role holds. Lookups over string tokens are total: unknown role or capability
//! tokens resolve to an empty set / `false` / `None`.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::role::{ClubRole, SystemRole};

bitflags! {
    /// Club-scoped capability flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// See club details
        const VIEW_CLUB            = 1 << 0;
        /// List club members
        const VIEW_MEMBERS         = 1 << 1;
        /// Sign up for club rides
        const JOIN_RIDES           = 1 << 2;
        /// Publish new rides
        const CREATE_RIDES         = 1 << 3;
        /// Edit or cancel any club ride
        const MANAGE_RIDES         = 1 << 4;
        /// See pending join requests
        const VIEW_JOIN_REQUESTS   = 1 << 5;
        /// Send invitations (email or in-app)
        const INVITE_MEMBERS       = 1 << 6;
        /// Approve or reject join requests
        const MANAGE_JOIN_REQUESTS = 1 << 7;
        /// Suspend, reinstate, remove members and change their roles
        const MANAGE_MEMBERS       = 1 << 8;
        /// List the club's invitations
        const VIEW_INVITATIONS     = 1 << 9;
        /// Promote or demote to captain
        const ASSIGN_CAPTAIN_ROLE  = 1 << 10;
        /// Edit club settings (owner only)
        const MANAGE_CLUB_SETTINGS = 1 << 11;
        /// Promote or demote to admin (owner only)
        const ASSIGN_ADMIN_ROLE    = 1 << 12;

        const MEMBER = Self::VIEW_CLUB.bits()
            | Self::VIEW_MEMBERS.bits()
            | Self::JOIN_RIDES.bits();

        const CAPTAIN = Self::MEMBER.bits()
            | Self::CREATE_RIDES.bits()
            | Self::MANAGE_RIDES.bits()
            | Self::VIEW_JOIN_REQUESTS.bits();

        const ADMIN = Self::CAPTAIN.bits()
            | Self::INVITE_MEMBERS.bits()
            | Self::MANAGE_JOIN_REQUESTS.bits()
            | Self::MANAGE_MEMBERS.bits()
            | Self::VIEW_INVITATIONS.bits()
            | Self::ASSIGN_CAPTAIN_ROLE.bits();

        const OWNER = Self::ADMIN.bits()
            | Self::MANAGE_CLUB_SETTINGS.bits()
            | Self::ASSIGN_ADMIN_ROLE.bits();
    }
}

/// Token names for each single capability, lowest bit first
const CAPABILITY_TOKENS: [(Capabilities, &str); 13] = [
    (Capabilities::VIEW_CLUB, "view-club"),
    (Capabilities::VIEW_MEMBERS, "view-members"),
    (Capabilities::JOIN_RIDES, "join-rides"),
    (Capabilities::CREATE_RIDES, "create-rides"),
    (Capabilities::MANAGE_RIDES, "manage-rides"),
    (Capabilities::VIEW_JOIN_REQUESTS, "view-join-requests"),
    (Capabilities::INVITE_MEMBERS, "invite-members"),
    (Capabilities::MANAGE_JOIN_REQUESTS, "manage-join-requests"),
    (Capabilities::MANAGE_MEMBERS, "manage-members"),
    (Capabilities::VIEW_INVITATIONS, "view-invitations"),
    (Capabilities::ASSIGN_CAPTAIN_ROLE, "assign-captain-role"),
    (Capabilities::MANAGE_CLUB_SETTINGS, "manage-club-settings"),
    (Capabilities::ASSIGN_ADMIN_ROLE, "assign-admin-role"),
];

impl Capabilities {
    /// Capability set granted by a club role
    pub fn for_role(role: ClubRole) -> Self {
        match role {
            ClubRole::Member => Self::MEMBER,
            ClubRole::Captain => Self::CAPTAIN,
            ClubRole::Admin => Self::ADMIN,
            ClubRole::Owner => Self::OWNER,
        }
    }

    /// Resolve a single capability token
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        CAPABILITY_TOKENS
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(token))
            .map(|(cap, _)| *cap)
    }

    /// Token names of every capability in the set
    pub fn tokens(&self) -> Vec<&'static str> {
        CAPABILITY_TOKENS
            .iter()
            .filter(|(cap, _)| self.contains(*cap))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Comma separated token names, used in error and audit context
    pub fn describe(&self) -> String {
        self.tokens().join(", ")
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities::empty()
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Capability set for a role
pub fn capabilities_for(role: ClubRole) -> Capabilities {
    Capabilities::for_role(role)
}

/// Whether `role` holds every flag in `capability`; the empty set is never held
pub fn role_has_capability(role: ClubRole, capability: Capabilities) -> bool {
    !capability.is_empty() && Capabilities::for_role(role).contains(capability)
}

/// Lowest role whose set contains `capability`
pub fn minimum_role_for(capability: Capabilities) -> Option<ClubRole> {
    if capability.is_empty() {
        return None;
    }
    ClubRole::ALL
        .into_iter()
        .find(|role| Capabilities::for_role(*role).contains(capability))
}

/// Capability set for a role token; unknown roles yield the empty set
pub fn capabilities_for_token(role: &str) -> Capabilities {
    ClubRole::parse(role).map(Capabilities::for_role).unwrap_or_default()
}

/// Token form of `role_has_capability`; unknown tokens yield `false`
pub fn role_token_has_capability(role: &str, capability: &str) -> bool {
    match (ClubRole::parse(role), Capabilities::from_token(capability)) {
        (Some(role), Some(capability)) => role_has_capability(role, capability),
        _ => false,
    }
}

/// Token form of `minimum_role_for`; unknown tokens yield `None`
pub fn minimum_role_for_token(capability: &str) -> Option<ClubRole> {
    Capabilities::from_token(capability).and_then(minimum_role_for)
}

bitflags! {
    /// Platform-scoped capability flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SystemCapabilities: u32 {
        /// Administer platform-wide settings
        const MANAGE_PLATFORM           = 1 << 0;
        /// Bypass every club-level capability check
        const OVERRIDE_CLUB_PERMISSIONS = 1 << 1;

        const SITE_ADMIN = Self::MANAGE_PLATFORM.bits()
            | Self::OVERRIDE_CLUB_PERMISSIONS.bits();
    }
}

impl SystemCapabilities {
    /// Derive platform capabilities from the actor's system role and admin flag
    pub fn derive(system_role: SystemRole, is_site_admin: bool) -> Self {
        if is_site_admin || system_role == SystemRole::SiteAdmin {
            Self::SITE_ADMIN
        } else {
            Self::empty()
        }
    }

    #[inline]
    pub fn has_override(&self) -> bool {
        self.contains(Self::OVERRIDE_CLUB_PERMISSIONS)
    }
}

impl Default for SystemCapabilities {
    fn default() -> Self {
        SystemCapabilities::empty()
    }
}

// Cached as raw bits
impl Serialize for SystemCapabilities {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for SystemCapabilities {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(SystemCapabilities::from_bits_truncate(bits))
    }
}
