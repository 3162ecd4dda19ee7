//! Handlers for the category taxonomy and fund subscriptions.
//!
//! Structural mutations (create / edit / remove) are owner-or-admin;
//! subscription toggles are open to any member. Custom trees are
//! fund-private: a custom leaf's parent must be a custom root of the same
//! fund.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use fundmate_core::category::{
    ensure_custom_parent, ensure_editable, ensure_subscribable, validate_category_description,
    validate_category_name, ParentCheck,
};
use fundmate_core::error::CoreError;
use fundmate_core::types::DbId;
use fundmate_db::models::category::{
    Category, CreateCategory, DefaultCategoryGroup, UpdateCategory,
};
use fundmate_db::repositories::{CategoryRepo, FundCategoryRepo};

use crate::error::{AppError, AppResult};
use crate::membership::{assert_admin_or_owner, assert_membership, require_fund};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /funds/{id}/categories`.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<DbId>,
}

/// Request body for `PATCH /categories/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /api/funds/{id}/categories
///
/// The leaf categories the fund is actively subscribed to, custom first --
/// the same set and order the classifier prompt consumes.
pub async fn list_active(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(fund_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    require_fund(&state.pool, fund_id).await?;
    assert_membership(&state.pool, fund_id, auth.user_id).await?;

    let categories = CategoryRepo::active_leaves_for_fund(&state.pool, fund_id).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// GET /api/funds/{id}/categories/defaults
///
/// The default taxonomy as a two-level tree, each leaf annotated with the
/// fund's subscription state.
pub async fn default_tree(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(fund_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<DefaultCategoryGroup>>>> {
    require_fund(&state.pool, fund_id).await?;
    assert_membership(&state.pool, fund_id, auth.user_id).await?;

    let roots = CategoryRepo::default_roots(&state.pool).await?;
    let leaves = CategoryRepo::default_leaves_with_subscription(&state.pool, fund_id).await?;

    let groups = roots
        .into_iter()
        .map(|root| {
            let children = leaves
                .iter()
                .filter(|leaf| leaf.parent_id == Some(root.id))
                .cloned()
                .collect();
            DefaultCategoryGroup {
                id: root.id,
                name: root.name,
                description: root.description,
                children,
            }
        })
        .collect();

    Ok(Json(DataResponse { data: groups }))
}

// ---------------------------------------------------------------------------
// Structural mutations
// ---------------------------------------------------------------------------

/// POST /api/funds/{id}/categories
///
/// Create a custom category. With a `parent_id` the result is a leaf and is
/// auto-subscribed; without one it is a new custom root.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(fund_id): Path<DbId>,
    Json(input): Json<CreateCategoryRequest>,
) -> AppResult<impl IntoResponse> {
    require_fund(&state.pool, fund_id).await?;
    assert_admin_or_owner(&state.pool, fund_id, auth.user_id).await?;

    validate_category_name(&input.name)?;
    validate_category_description(input.description.as_deref())?;

    if let Some(parent_id) = input.parent_id {
        let parent = CategoryRepo::find_by_id(&state.pool, parent_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Category",
                id: parent_id,
            }))?;
        ensure_custom_parent(
            fund_id,
            ParentCheck {
                fund_id: parent.fund_id,
                parent_id: parent.parent_id,
                is_default: parent.is_default,
            },
        )?;
    }

    if CategoryRepo::name_exists_at_level(&state.pool, fund_id, input.parent_id, &input.name)
        .await?
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "A category named '{}' already exists at this level",
            input.name.trim()
        ))));
    }

    let category = CategoryRepo::create(
        &state.pool,
        &CreateCategory {
            name: input.name.trim().to_string(),
            description: input.description,
            parent_id: input.parent_id,
            is_default: false,
            fund_id: Some(fund_id),
        },
    )
    .await?;

    // A fresh custom leaf is immediately usable on transactions.
    if category.parent_id.is_some() {
        FundCategoryRepo::upsert_active(&state.pool, fund_id, category.id).await?;
    }

    tracing::info!(fund_id, category_id = category.id, "Custom category created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// PATCH /api/categories/{id}
///
/// Edit a custom category's name/description. Defaults are immutable.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
    Json(input): Json<UpdateCategoryRequest>,
) -> AppResult<Json<DataResponse<Category>>> {
    let category = CategoryRepo::find_by_id(&state.pool, category_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }))?;

    ensure_editable(category.is_default)?;
    let fund_id = category.fund_id.ok_or_else(|| {
        AppError::InternalError("Non-default category without a fund".into())
    })?;
    assert_admin_or_owner(&state.pool, fund_id, auth.user_id).await?;

    if let Some(name) = &input.name {
        validate_category_name(name)?;
        if !name.trim().eq_ignore_ascii_case(&category.name)
            && CategoryRepo::name_exists_at_level(&state.pool, fund_id, category.parent_id, name)
                .await?
        {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "A category named '{}' already exists at this level",
                name.trim()
            ))));
        }
    }
    validate_category_description(input.description.as_deref())?;

    let updated = CategoryRepo::update(
        &state.pool,
        category_id,
        &UpdateCategory {
            name: input.name.map(|n| n.trim().to_string()),
            description: input.description,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Category",
        id: category_id,
    }))?;

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/funds/{id}/categories/{category_id}
///
/// Remove a category from a fund. A default category is detached by
/// deactivating the fund's subscription (non-destructive, other funds are
/// unaffected); a custom category is soft-deleted outright.
pub async fn remove(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((fund_id, category_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    require_fund(&state.pool, fund_id).await?;
    assert_admin_or_owner(&state.pool, fund_id, auth.user_id).await?;

    let category = CategoryRepo::find_by_id(&state.pool, category_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }))?;

    if category.is_default {
        let existed = FundCategoryRepo::deactivate(&state.pool, fund_id, category_id).await?;
        if !existed {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Category subscription",
                id: category_id,
            }));
        }
        tracing::info!(fund_id, category_id, "Default category detached");
    } else {
        if category.fund_id != Some(fund_id) {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Category",
                id: category_id,
            }));
        }
        CategoryRepo::soft_delete(&state.pool, category_id).await?;
        FundCategoryRepo::deactivate(&state.pool, fund_id, category_id).await?;
        tracing::info!(fund_id, category_id, "Custom category deleted");
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

/// POST /api/funds/{id}/categories/{category_id}/subscribe
///
/// Opt the fund into a leaf category. Roots are organizational only and
/// fail validation; custom leaves must belong to this fund.
pub async fn subscribe(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((fund_id, category_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    require_fund(&state.pool, fund_id).await?;
    assert_membership(&state.pool, fund_id, auth.user_id).await?;

    let category = subscribable_target(&state, fund_id, category_id).await?;
    ensure_subscribable(category.parent_id)?;

    let subscription = FundCategoryRepo::upsert_active(&state.pool, fund_id, category_id).await?;
    Ok(Json(DataResponse { data: subscription }))
}

/// POST /api/funds/{id}/categories/{category_id}/unsubscribe
///
/// Opt the fund out. Unsubscribing a pair that was never subscribed is
/// NotFound, not a silent no-op.
pub async fn unsubscribe(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((fund_id, category_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    require_fund(&state.pool, fund_id).await?;
    assert_membership(&state.pool, fund_id, auth.user_id).await?;

    FundCategoryRepo::find(&state.pool, fund_id, category_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category subscription",
            id: category_id,
        }))?;

    FundCategoryRepo::deactivate(&state.pool, fund_id, category_id).await?;
    Ok(Json(DataResponse {
        data: serde_json::json!({ "unsubscribed": true }),
    }))
}

/// POST /api/funds/{id}/categories/{category_id}/subscribe-children
///
/// Subscribe every child of a root in one pass. Returns how many rows were
/// created or reactivated (already-active children do not count).
pub async fn subscribe_children(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((fund_id, parent_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    require_fund(&state.pool, fund_id).await?;
    assert_membership(&state.pool, fund_id, auth.user_id).await?;

    let parent = subscribable_target(&state, fund_id, parent_id).await?;
    if parent.parent_id.is_some() {
        return Err(AppError::Core(CoreError::Validation(
            "subscribe-children targets a root category".into(),
        )));
    }

    let children = CategoryRepo::children_of(&state.pool, parent_id).await?;
    let ids: Vec<DbId> = children.iter().map(|c| c.id).collect();
    let subscribed = FundCategoryRepo::subscribe_many(&state.pool, fund_id, &ids).await?;

    tracing::info!(fund_id, parent_id, subscribed, "Subscribed children of root");
    Ok(Json(DataResponse {
        data: serde_json::json!({ "subscribed": subscribed }),
    }))
}

/// POST /api/funds/{id}/categories/subscribe-defaults
///
/// Subscribe every default leaf in one pass, returning the count touched.
pub async fn subscribe_defaults(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(fund_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_fund(&state.pool, fund_id).await?;
    assert_membership(&state.pool, fund_id, auth.user_id).await?;

    let leaves = CategoryRepo::default_leaves_with_subscription(&state.pool, fund_id).await?;
    let ids: Vec<DbId> = leaves.iter().map(|c| c.id).collect();
    let subscribed = FundCategoryRepo::subscribe_many(&state.pool, fund_id, &ids).await?;

    tracing::info!(fund_id, subscribed, "Subscribed default leaves");
    Ok(Json(DataResponse {
        data: serde_json::json!({ "subscribed": subscribed }),
    }))
}

/// Load a category a fund may subscribe to: any default, or a custom row
/// belonging to this fund. Another fund's custom categories are invisible.
async fn subscribable_target(
    state: &AppState,
    fund_id: DbId,
    category_id: DbId,
) -> AppResult<Category> {
    let category = CategoryRepo::find_by_id(&state.pool, category_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }))?;

    if !category.is_default && category.fund_id != Some(fund_id) {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }));
    }
    Ok(category)
}
