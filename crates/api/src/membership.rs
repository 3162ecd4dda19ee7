//! Membership registry: the single authorization choke point for funds.
//!
//! Every handler that touches fund-scoped data resolves the caller's
//! membership through these functions, so the role policy in
//! `fundmate_core::roles` is enforced in exactly one place.

use sqlx::PgPool;

use fundmate_core::error::CoreError;
use fundmate_core::roles::FundRole;
use fundmate_core::types::DbId;
use fundmate_db::models::fund::Fund;
use fundmate_db::models::fund_member::FundMember;
use fundmate_db::repositories::{FundMemberRepo, FundRepo};

use crate::error::{AppError, AppResult};

/// Load a fund or fail NotFound. Soft-deleted funds are invisible.
pub async fn require_fund(pool: &PgPool, fund_id: DbId) -> AppResult<Fund> {
    FundRepo::find_by_id(pool, fund_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Fund", id: fund_id }))
}

/// Assert that `user_id` is an active member of `fund_id`.
///
/// Returns the membership row; non-members get an opaque Forbidden with no
/// hint whether the fund exists.
pub async fn assert_membership(
    pool: &PgPool,
    fund_id: DbId,
    user_id: DbId,
) -> AppResult<FundMember> {
    FundMemberRepo::find(pool, fund_id, user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "You are not a member of this fund".into(),
            ))
        })
}

/// Assert membership and return the caller's parsed role.
pub async fn assert_role(pool: &PgPool, fund_id: DbId, user_id: DbId) -> AppResult<FundRole> {
    let member = assert_membership(pool, fund_id, user_id).await?;
    FundRole::from_str(&member.role).map_err(AppError::Core)
}

/// Assert that the caller may manage the fund (owner or admin).
pub async fn assert_admin_or_owner(
    pool: &PgPool,
    fund_id: DbId,
    user_id: DbId,
) -> AppResult<FundRole> {
    let role = assert_role(pool, fund_id, user_id).await?;
    fundmate_core::roles::ensure_can_manage_members(role)?;
    Ok(role)
}

/// Assert that the caller is the fund owner.
pub async fn assert_owner(pool: &PgPool, fund_id: DbId, user_id: DbId) -> AppResult<FundRole> {
    let role = assert_role(pool, fund_id, user_id).await?;
    if role != FundRole::Owner {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the fund owner may perform this action".into(),
        )));
    }
    Ok(role)
}
