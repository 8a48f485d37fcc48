//! Identifier newtypes
//!
//! Club and user ids are issued by external collaborators and treated as opaque
//! strings. Membership and invitation ids are generated locally as UUID v4 strings.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[inline]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// True when the id is empty or whitespace only
            #[inline]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a club (owned by the club service)
    ClubId
);
string_id!(
    /// Identifier of a user (owned by the user service)
    UserId
);
string_id!(
    /// Globally unique membership identifier
    MembershipId
);
string_id!(
    /// Globally unique invitation identifier
    InvitationId
);

impl MembershipId {
    /// Generate a fresh random membership id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl InvitationId {
    /// Generate a fresh random invitation id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_conversions() {
        let id = ClubId::from("club-1");
        assert_eq!(id.to_string(), "club-1");
        assert_eq!(id.as_str(), "club-1");
        assert_eq!(UserId::new(String::from("u1")).into_inner(), "u1");
    }

    #[test]
    fn test_blank_detection() {
        assert!(UserId::from("   ").is_blank());
        assert!(UserId::from("").is_blank());
        assert!(!UserId::from("u1").is_blank());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = MembershipId::generate();
        let b = MembershipId::generate();
        assert_ne!(a, b);
        assert_eq!(InvitationId::generate().as_str().len(), 36);
    }

    #[test]
    fn test_serializes_transparently() {
        let json = serde_json::to_string(&ClubId::from("c1")).unwrap();
        assert_eq!(json, "\"c1\"");
    }
}
