//! Club and system roles
//!
//! `ClubRole` is the single ordered role hierarchy (member < captain < admin < owner).
//! Declaration order drives the derived `Ord`, so comparisons such as
//! `actor_role >= target_role` read the hierarchy directly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Role a user holds inside one club
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClubRole {
    Member,
    Captain,
    Admin,
    Owner,
}

impl ClubRole {
    /// Every club role, lowest first
    pub const ALL: [ClubRole; 4] = [Self::Member, Self::Captain, Self::Admin, Self::Owner];

    /// Numeric level in the hierarchy (member = 1 .. owner = 4)
    #[inline]
    pub fn level(self) -> u8 {
        match self {
            Self::Member => 1,
            Self::Captain => 2,
            Self::Admin => 3,
            Self::Owner => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Captain => "captain",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }

    /// Parse a role token; unknown tokens yield `None`
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "member" => Some(Self::Member),
            "captain" => Some(Self::Captain),
            "admin" => Some(Self::Admin),
            "owner" => Some(Self::Owner),
            _ => None,
        }
    }

    /// The role immediately below this one in the hierarchy
    pub fn below(self) -> Option<Self> {
        match self {
            Self::Member => None,
            Self::Captain => Some(Self::Member),
            Self::Admin => Some(Self::Captain),
            Self::Owner => Some(Self::Admin),
        }
    }

    /// Role changes permitted through a role update.
    ///
    /// Owner is never a source nor a target: ownership moves only through a
    /// dedicated transfer flow.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Member, Self::Captain | Self::Admin)
                | (Self::Captain, Self::Member | Self::Admin)
                | (Self::Admin, Self::Captain | Self::Member)
        )
    }

    #[inline]
    pub fn is_admin_or_owner(self) -> bool {
        matches!(self, Self::Admin | Self::Owner)
    }
}

impl fmt::Display for ClubRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClubRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::Validation(format!("Unknown club role: {s}")))
    }
}

/// Platform-level role, independent of any club
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SystemRole {
    #[default]
    User,
    SiteAdmin,
}

impl SystemRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::SiteAdmin => "site-admin",
        }
    }
}

impl fmt::Display for SystemRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SystemRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "site-admin" | "site_admin" => Ok(Self::SiteAdmin),
            _ => Err(DomainError::Validation(format!("Unknown system role: {s}"))),
        }
    }
}
