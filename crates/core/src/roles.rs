//! Fund membership roles and the mutation policy around them.
//!
//! Every fund has exactly one owner (the creator). Owners and admins may
//! manage members, but the owner role itself is never assigned or removed
//! through the normal mutation paths, and admins are managed by the owner
//! only.

use crate::error::CoreError;
use serde::Serialize;

/// Role of a user within a fund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FundRole {
    Owner,
    Admin,
    Member,
}

/// All valid role strings.
pub const VALID_ROLES: &[&str] = &["owner", "admin", "member"];

impl FundRole {
    /// Return the role as a lowercase string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Parse a role from a string slice.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            _ => Err(CoreError::Validation(format!(
                "Invalid fund role '{s}'. Must be one of: {}",
                VALID_ROLES.join(", ")
            ))),
        }
    }

    /// Whether this role may manage members and join requests.
    pub fn can_manage_members(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }
}

// ---------------------------------------------------------------------------
// Mutation policy
// ---------------------------------------------------------------------------

/// Require a role that may manage members (owner or admin).
pub fn ensure_can_manage_members(caller: FundRole) -> Result<(), CoreError> {
    if caller.can_manage_members() {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only the fund owner or an admin may manage members".to_string(),
        ))
    }
}

/// Validate that `caller` may assign `new_role` to another member.
///
/// The owner role is never assignable: ownership is fixed at fund creation.
/// Promoting to (or demoting from) admin is reserved to the owner.
pub fn ensure_role_assignable(caller: FundRole, new_role: FundRole) -> Result<(), CoreError> {
    ensure_can_manage_members(caller)?;

    match new_role {
        FundRole::Owner => Err(CoreError::Validation(
            "The owner role cannot be assigned".to_string(),
        )),
        FundRole::Admin if caller != FundRole::Owner => Err(CoreError::Forbidden(
            "Only the fund owner may grant the admin role".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Validate that `caller` may change the role of a member who currently
/// holds `current_role`.
///
/// The owner's row is immutable; an admin's row may only be touched by the
/// owner.
pub fn ensure_role_changeable(caller: FundRole, current_role: FundRole) -> Result<(), CoreError> {
    ensure_can_manage_members(caller)?;

    match current_role {
        FundRole::Owner => Err(CoreError::Validation(
            "The owner role cannot be changed".to_string(),
        )),
        FundRole::Admin if caller != FundRole::Owner => Err(CoreError::Forbidden(
            "Only the fund owner may change an admin's role".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Validate that `caller` may remove a member who holds `target_role`.
///
/// The owner can never be removed; admins are removable by the owner only.
pub fn ensure_member_removable(caller: FundRole, target_role: FundRole) -> Result<(), CoreError> {
    ensure_can_manage_members(caller)?;

    match target_role {
        FundRole::Owner => Err(CoreError::Validation(
            "The fund owner cannot be removed".to_string(),
        )),
        FundRole::Admin if caller != FundRole::Owner => Err(CoreError::Forbidden(
            "Only the fund owner may remove an admin".to_string(),
        )),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
