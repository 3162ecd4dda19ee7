//! Handlers for the `/funds` resource.
//!
//! Fund creation allocates the share code by bounded rejection sampling:
//! the existence check is a pre-filter and `uq_funds_share_code` is the
//! correctness backstop, so a write-time collision retries the loop instead
//! of failing the request.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use fundmate_core::error::CoreError;
use fundmate_core::fund::{
    last_activity_at, validate_fund_description, validate_fund_name, validate_share_code,
    FundType, RandomShareCodes, ShareCodeSource, SHARE_CODE_MAX_ATTEMPTS,
};
use fundmate_core::pagination::{clamp_page, clamp_per_page, offset};
use fundmate_core::roles::FundRole;
use fundmate_core::types::DbId;
use fundmate_db::models::fund::{CreateFund, Fund, FundWithActivity, PublicFundInfo, UpdateFund};
use fundmate_db::repositories::{CategoryRepo, FundCategoryRepo, FundMemberRepo, FundRepo};

use crate::error::{AppError, AppResult};
use crate::membership::{assert_admin_or_owner, assert_membership, assert_owner, require_fund};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, PagedResponse, Pagination};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /funds`.
#[derive(Debug, Deserialize)]
pub struct CreateFundRequest {
    pub name: String,
    #[serde(default = "default_fund_type")]
    pub fund_type: String,
    pub description: Option<String>,
    #[serde(default = "default_open_dialog")]
    pub open_dialog: bool,
}

fn default_fund_type() -> String {
    "shared".to_string()
}

fn default_open_dialog() -> bool {
    true
}

/// Request body for `PATCH /funds/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateFundRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub open_dialog: Option<bool>,
}

/// Query parameters for `GET /funds`.
#[derive(Debug, Deserialize)]
pub struct ListFundsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Query parameters for `GET /funds/lookup`.
#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub share_code: String,
}

/// Response body for `GET /funds/{id}/membership`.
#[derive(Debug, Serialize)]
pub struct MembershipStatus {
    pub is_member: bool,
    pub role: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/funds
///
/// Create a fund. The creator becomes owner and first member, a share code
/// is allocated, and every default leaf category is subscribed.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateFundRequest>,
) -> AppResult<impl IntoResponse> {
    validate_fund_name(&input.name)?;
    validate_fund_description(input.description.as_deref())?;
    let fund_type = FundType::from_str(&input.fund_type)?;

    let mut codes = RandomShareCodes;
    let fund = create_with_share_code(
        &state.pool,
        &mut codes,
        CreateFund {
            name: input.name.trim().to_string(),
            fund_type: fund_type.as_str().to_string(),
            owner_id: auth.user_id,
            share_code: String::new(), // filled per attempt
            description: input.description,
            open_dialog: input.open_dialog,
        },
    )
    .await?;

    FundMemberRepo::upsert_active(&state.pool, fund.id, auth.user_id, FundRole::Owner.as_str())
        .await?;

    // New funds start with the full default taxonomy active.
    let default_leaves = CategoryRepo::default_leaves_with_subscription(&state.pool, fund.id).await?;
    let leaf_ids: Vec<DbId> = default_leaves.iter().map(|c| c.id).collect();
    FundCategoryRepo::subscribe_many(&state.pool, fund.id, &leaf_ids).await?;

    tracing::info!(fund_id = fund.id, owner_id = auth.user_id, "Fund created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: fund })))
}

/// GET /api/funds
///
/// List the caller's funds, most recently active first. The activity key is
/// recomputed per row (newest-message pointer falling back to `updated_at`)
/// and sorted in memory, then the page is sliced -- the denormalized
/// pointer alone is never trusted for ordering.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListFundsQuery>,
) -> AppResult<Json<PagedResponse<FundWithActivity>>> {
    let page = clamp_page(query.page);
    let per_page = clamp_per_page(query.per_page);

    let funds = FundRepo::list_for_user(&state.pool, auth.user_id).await?;
    let total = funds.len() as i64;

    let mut with_activity: Vec<FundWithActivity> = funds
        .into_iter()
        .map(|fund| {
            let last_activity = last_activity_at(fund.last_message_at, fund.updated_at);
            FundWithActivity {
                fund,
                last_activity_at: last_activity,
            }
        })
        .collect();
    with_activity.sort_by(|a, b| {
        b.last_activity_at
            .cmp(&a.last_activity_at)
            .then(b.fund.id.cmp(&a.fund.id))
    });

    let data = with_activity
        .into_iter()
        .skip(offset(page, per_page) as usize)
        .take(per_page as usize)
        .collect();

    Ok(Json(PagedResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
        },
    }))
}

/// GET /api/funds/lookup?share_code=NNNNNN
///
/// Exact-match public lookup. Deliberately no fuzzy or prefix variant:
/// funds are discoverable only by the full code.
pub async fn lookup(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> AppResult<Json<DataResponse<PublicFundInfo>>> {
    validate_share_code(&query.share_code)?;

    // A miss is a plain 404; the code is not echoed back beyond the
    // request, keeping enumeration attempts uninformative.
    let info = FundRepo::public_info_by_share_code(&state.pool, &query.share_code)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;

    Ok(Json(DataResponse { data: info }))
}

/// GET /api/funds/{id}
///
/// Fetch a fund. Members only.
pub async fn get(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(fund_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Fund>>> {
    let fund = require_fund(&state.pool, fund_id).await?;
    assert_membership(&state.pool, fund_id, auth.user_id).await?;
    Ok(Json(DataResponse { data: fund }))
}

/// GET /api/funds/{id}/membership
///
/// The caller's membership status in a fund. Never 403s: "not a member" is
/// the answer, not an error.
pub async fn my_membership(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(fund_id): Path<DbId>,
) -> AppResult<Json<DataResponse<MembershipStatus>>> {
    require_fund(&state.pool, fund_id).await?;
    let member = FundMemberRepo::find(&state.pool, fund_id, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: MembershipStatus {
            is_member: member.is_some(),
            role: member.map(|m| m.role),
        },
    }))
}

/// PATCH /api/funds/{id}
///
/// Update fund metadata. Owner or admin only.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(fund_id): Path<DbId>,
    Json(input): Json<UpdateFundRequest>,
) -> AppResult<Json<DataResponse<Fund>>> {
    require_fund(&state.pool, fund_id).await?;
    assert_admin_or_owner(&state.pool, fund_id, auth.user_id).await?;

    if let Some(name) = &input.name {
        validate_fund_name(name)?;
    }
    validate_fund_description(input.description.as_deref())?;

    let updated = FundRepo::update(
        &state.pool,
        fund_id,
        &UpdateFund {
            name: input.name.map(|n| n.trim().to_string()),
            description: input.description,
            open_dialog: input.open_dialog,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Fund",
        id: fund_id,
    }))?;

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/funds/{id}
///
/// Soft-delete a fund. Owner only.
pub async fn remove(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(fund_id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_fund(&state.pool, fund_id).await?;
    assert_owner(&state.pool, fund_id, auth.user_id).await?;

    FundRepo::soft_delete(&state.pool, fund_id).await?;
    tracing::info!(fund_id, "Fund deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Share-code allocation
// ---------------------------------------------------------------------------

/// Insert the fund with a freshly allocated share code, retrying on
/// collision up to [`SHARE_CODE_MAX_ATTEMPTS`] times.
pub async fn create_with_share_code(
    pool: &sqlx::PgPool,
    codes: &mut dyn ShareCodeSource,
    mut input: CreateFund,
) -> AppResult<Fund> {
    for _ in 0..SHARE_CODE_MAX_ATTEMPTS {
        let code = codes.allocate();

        // Pre-filter only; the unique constraint decides under concurrency.
        if FundRepo::share_code_exists(pool, &code).await? {
            continue;
        }

        input.share_code = code;
        match FundRepo::create(pool, &input).await {
            Ok(fund) => return Ok(fund),
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some("23505")
                    && db_err.constraint() == Some("uq_funds_share_code") =>
            {
                tracing::debug!(code = %input.share_code, "Share code lost a race; retrying");
                continue;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(AppError::Core(CoreError::ShareCodeExhausted {
        attempts: SHARE_CODE_MAX_ATTEMPTS,
    }))
}
