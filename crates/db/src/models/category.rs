//! Category entity model and DTOs.

use fundmate_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full category row from the `categories` table.
///
/// `fund_id` is `None` for system defaults. A row with a `parent_id` is a
/// leaf; only leaves can be subscribed or used on transactions.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<DbId>,
    pub is_default: bool,
    pub fund_id: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A default leaf together with the fund's subscription state.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryWithSubscription {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<DbId>,
    pub is_default: bool,
    pub is_subscribed: bool,
}

/// One root of the default taxonomy with its children, as served by the
/// defaults listing.
#[derive(Debug, Clone, Serialize)]
pub struct DefaultCategoryGroup {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub children: Vec<CategoryWithSubscription>,
}

/// DTO for creating a category row.
#[derive(Debug)]
pub struct CreateCategory {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<DbId>,
    pub is_default: bool,
    pub fund_id: Option<DbId>,
}

/// DTO for updating a category. All fields are optional.
#[derive(Debug, Default)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<String>,
}
