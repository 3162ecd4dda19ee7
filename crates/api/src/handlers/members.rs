//! Handlers for fund members.
//!
//! All mutations funnel the caller's and target's roles through the policy
//! functions in `fundmate_core::roles`, so the owner row stays immutable
//! and admins are managed by the owner only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use fundmate_core::error::CoreError;
use fundmate_core::roles::{
    ensure_member_removable, ensure_role_assignable, ensure_role_changeable, FundRole,
};
use fundmate_core::types::DbId;
use fundmate_db::models::fund_member::FundMemberWithUser;
use fundmate_db::repositories::{FundMemberRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::membership::{assert_admin_or_owner, assert_membership, require_fund};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /funds/{id}/members`.
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: DbId,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    FundRole::Member.as_str().to_string()
}

/// Request body for `PATCH /funds/{id}/members/{user_id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/funds/{id}/members
///
/// List a fund's active members with profile details. Members only.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(fund_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<FundMemberWithUser>>>> {
    require_fund(&state.pool, fund_id).await?;
    assert_membership(&state.pool, fund_id, auth.user_id).await?;

    let members = FundMemberRepo::list_by_fund(&state.pool, fund_id).await?;
    Ok(Json(DataResponse { data: members }))
}

/// POST /api/funds/{id}/members
///
/// Add a user directly (without the join-request flow). Caller must be
/// owner or admin; the owner role is never assignable.
pub async fn add(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(fund_id): Path<DbId>,
    Json(input): Json<AddMemberRequest>,
) -> AppResult<impl IntoResponse> {
    require_fund(&state.pool, fund_id).await?;
    let caller_role = assert_admin_or_owner(&state.pool, fund_id, auth.user_id).await?;

    let new_role = FundRole::from_str(&input.role)?;
    ensure_role_assignable(caller_role, new_role)?;

    UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }))?;

    if FundMemberRepo::find(&state.pool, fund_id, input.user_id)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "User is already a member of this fund".into(),
        )));
    }

    let member =
        FundMemberRepo::upsert_active(&state.pool, fund_id, input.user_id, new_role.as_str())
            .await?;

    tracing::info!(
        fund_id,
        user_id = input.user_id,
        role = %member.role,
        "Member added"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: member })))
}

/// PATCH /api/funds/{id}/members/{user_id}
///
/// Change a member's role. The owner row is immutable; admin rows are
/// touched by the owner only.
pub async fn update_role(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((fund_id, user_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateRoleRequest>,
) -> AppResult<impl IntoResponse> {
    require_fund(&state.pool, fund_id).await?;
    let caller_role = assert_admin_or_owner(&state.pool, fund_id, auth.user_id).await?;

    let target = FundMemberRepo::find(&state.pool, fund_id, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Fund member",
            id: user_id,
        }))?;
    let current_role = FundRole::from_str(&target.role)?;
    let new_role = FundRole::from_str(&input.role)?;

    ensure_role_changeable(caller_role, current_role)?;
    ensure_role_assignable(caller_role, new_role)?;

    FundMemberRepo::update_role(&state.pool, fund_id, user_id, new_role.as_str()).await?;

    // Refetch for the response body. A row gone by now was removed under
    // our feet; that is a missing target, not a permission problem.
    let updated = FundMemberRepo::find(&state.pool, fund_id, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Fund member",
            id: user_id,
        }))?;
    tracing::info!(fund_id, user_id, role = %updated.role, "Member role changed");
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/funds/{id}/members/{user_id}
///
/// Remove a member. The owner can never be removed; admins are removable
/// by the owner only.
pub async fn remove(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((fund_id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    require_fund(&state.pool, fund_id).await?;
    let caller_role = assert_admin_or_owner(&state.pool, fund_id, auth.user_id).await?;

    let target = FundMemberRepo::find(&state.pool, fund_id, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Fund member",
            id: user_id,
        }))?;
    let target_role = FundRole::from_str(&target.role)?;

    ensure_member_removable(caller_role, target_role)?;

    FundMemberRepo::soft_remove(&state.pool, fund_id, user_id).await?;
    tracing::info!(fund_id, user_id, "Member removed");
    Ok(StatusCode::NO_CONTENT)
}
