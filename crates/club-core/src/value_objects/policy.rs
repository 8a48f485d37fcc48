//! Role hierarchy rules shared by member management and role assignment

use std::fmt;

use super::role::ClubRole;

/// Whether an actor holding `actor_role` may manage a member holding `target_role`.
///
/// Owners are never manageable through club-level roles; everyone else is
/// manageable by an actor at the same level or above.
pub fn can_manage(actor_role: ClubRole, target_role: ClubRole) -> bool {
    target_role != ClubRole::Owner && actor_role >= target_role
}

/// Reason a role assignment was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleAssignmentDenial {
    OwnerNotAssignable,
    OnlyOwnersAssignAdmin,
    OnlyAdminsAssignCaptain,
    OnlyAdminsAssignMember,
}

impl RoleAssignmentDenial {
    pub fn message(self) -> &'static str {
        match self {
            Self::OwnerNotAssignable => "owner role cannot be assigned directly",
            Self::OnlyOwnersAssignAdmin => "only owners can assign admin roles",
            Self::OnlyAdminsAssignCaptain => "only admins or owners can assign captain roles",
            Self::OnlyAdminsAssignMember => "only admins or owners can assign member roles",
        }
    }
}

impl fmt::Display for RoleAssignmentDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Check whether `actor_role` may hand out `target_role`
pub fn check_role_assignment(
    actor_role: ClubRole,
    target_role: ClubRole,
) -> Result<(), RoleAssignmentDenial> {
    match target_role {
        ClubRole::Owner => Err(RoleAssignmentDenial::OwnerNotAssignable),
        ClubRole::Admin if actor_role != ClubRole::Owner => {
            Err(RoleAssignmentDenial::OnlyOwnersAssignAdmin)
        }
        ClubRole::Captain if !actor_role.is_admin_or_owner() => {
            Err(RoleAssignmentDenial::OnlyAdminsAssignCaptain)
        }
        ClubRole::Member if !actor_role.is_admin_or_owner() => {
            Err(RoleAssignmentDenial::OnlyAdminsAssignMember)
        }
        _ => Ok(()),
    }
}
