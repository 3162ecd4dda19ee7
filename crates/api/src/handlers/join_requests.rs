//! Handlers for the fund join-request workflow.
//!
//! Requests move pending -> approved | rejected, both terminal. Creation is
//! idempotent while a request is pending, and a previously approved request
//! whose membership was since removed repairs the membership in place.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use fundmate_core::error::CoreError;
use fundmate_core::join_request::{ensure_reviewable, JoinRequestStatus};
use fundmate_core::roles::FundRole;
use fundmate_core::types::DbId;
use fundmate_db::models::join_request::{FundJoinRequest, JoinRequestWithUser};
use fundmate_db::repositories::{FundMemberRepo, JoinRequestRepo};

use crate::error::{AppError, AppResult};
use crate::membership::{assert_admin_or_owner, require_fund};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/funds/{id}/join-requests
///
/// Request access to a fund. Idempotent: a pending request is returned
/// unchanged on repeat calls. A prior approved request whose membership was
/// since removed re-adds the membership and returns that approved record.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(fund_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let fund = require_fund(&state.pool, fund_id).await?;

    if fund.owner_id == auth.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "The fund owner cannot request to join their own fund".into(),
        )));
    }
    if FundMemberRepo::find(&state.pool, fund_id, auth.user_id)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Validation(
            "You are already a member of this fund".into(),
        )));
    }

    if let Some(pending) = JoinRequestRepo::find_pending(&state.pool, fund_id, auth.user_id).await? {
        return Ok((StatusCode::OK, Json(DataResponse { data: pending })));
    }

    // Self-healing: an approved request with no surviving membership means
    // the user was removed after approval; simply re-add them.
    if let Some(approved) =
        JoinRequestRepo::find_latest_approved(&state.pool, fund_id, auth.user_id).await?
    {
        FundMemberRepo::upsert_active(
            &state.pool,
            fund_id,
            auth.user_id,
            FundRole::Member.as_str(),
        )
        .await?;
        tracing::info!(fund_id, user_id = auth.user_id, "Membership repaired from approved request");
        return Ok((StatusCode::OK, Json(DataResponse { data: approved })));
    }

    let request = JoinRequestRepo::create(&state.pool, fund_id, auth.user_id).await?;
    tracing::info!(fund_id, user_id = auth.user_id, request_id = request.id, "Join request created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/funds/{id}/join-requests
///
/// List a fund's requests, pending first. Owner or admin only.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(fund_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<JoinRequestWithUser>>>> {
    require_fund(&state.pool, fund_id).await?;
    assert_admin_or_owner(&state.pool, fund_id, auth.user_id).await?;

    let requests = JoinRequestRepo::list_by_fund(&state.pool, fund_id).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// POST /api/funds/{id}/join-requests/{rid}/approve
///
/// Approve a pending request and create-or-reactivate the membership with
/// role=member (approval never grants more).
pub async fn approve(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((fund_id, request_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<FundJoinRequest>>> {
    let request = decide(&state, fund_id, request_id, auth.user_id, JoinRequestStatus::Approved)
        .await?;

    // A requester added directly while the request sat pending keeps the
    // role they were given; approval only fills a missing membership.
    if FundMemberRepo::find(&state.pool, fund_id, request.user_id)
        .await?
        .is_none()
    {
        FundMemberRepo::upsert_active(
            &state.pool,
            fund_id,
            request.user_id,
            FundRole::Member.as_str(),
        )
        .await?;
    }

    tracing::info!(fund_id, request_id, user_id = request.user_id, "Join request approved");
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/funds/{id}/join-requests/{rid}/reject
///
/// Reject a pending request. Terminal; no membership change.
pub async fn reject(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((fund_id, request_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<FundJoinRequest>>> {
    let request = decide(&state, fund_id, request_id, auth.user_id, JoinRequestStatus::Rejected)
        .await?;

    tracing::info!(fund_id, request_id, "Join request rejected");
    Ok(Json(DataResponse { data: request }))
}

/// Shared review path: authorize the caller, check the request is still
/// pending, and apply the terminal status atomically.
async fn decide(
    state: &AppState,
    fund_id: DbId,
    request_id: DbId,
    caller_id: DbId,
    status: JoinRequestStatus,
) -> AppResult<FundJoinRequest> {
    require_fund(&state.pool, fund_id).await?;
    assert_admin_or_owner(&state.pool, fund_id, caller_id).await?;

    let request = JoinRequestRepo::find_by_id(&state.pool, request_id)
        .await?
        .filter(|r| r.fund_id == fund_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Join request",
            id: request_id,
        }))?;

    ensure_reviewable(JoinRequestStatus::from_str(&request.status)?)?;

    // The UPDATE carries its own pending guard; None here means a
    // concurrent reviewer won the race after our check.
    JoinRequestRepo::decide(&state.pool, request_id, status.as_str(), caller_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "Join request was already decided".into(),
            ))
        })
}
