//! Repository for the `categories` table.

use sqlx::PgPool;
use fundmate_core::types::DbId;

use crate::models::category::{Category, CategoryWithSubscription, CreateCategory, UpdateCategory};

const COLUMNS: &str = "\
    id, name, description, parent_id, is_default, fund_id, \
    deleted_at, created_at, updated_at";

/// Provides CRUD and taxonomy queries for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a new category, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCategory) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (name, description, parent_id, is_default, fund_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.parent_id)
            .bind(input.is_default)
            .bind(input.fund_id)
            .fetch_one(pool)
            .await
    }

    /// Find a category by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM categories WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a fund already has a category with this name under the same
    /// parent. Case-insensitive.
    pub async fn name_exists_at_level(
        pool: &PgPool,
        fund_id: DbId,
        parent_id: Option<DbId>,
        name: &str,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                 SELECT 1 FROM categories
                 WHERE fund_id = $1
                   AND parent_id IS NOT DISTINCT FROM $2
                   AND LOWER(name) = LOWER($3)
                   AND deleted_at IS NULL
             )",
        )
        .bind(fund_id)
        .bind(parent_id)
        .bind(name)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Update a category's name and/or description. Only non-`None` fields
    /// are applied. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a category by ID. Returns `true` if a row was marked.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE categories SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The leaf categories a fund is actively subscribed to, custom ones
    /// first, then alphabetical.
    ///
    /// This is the set (and order) the classifier is allowed to pick from.
    pub async fn active_leaves_for_fund(
        pool: &PgPool,
        fund_id: DbId,
    ) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "SELECT c.id, c.name, c.description, c.parent_id, c.is_default, c.fund_id,
                    c.deleted_at, c.created_at, c.updated_at
             FROM categories c
             JOIN fund_categories fc ON fc.category_id = c.id
             WHERE fc.fund_id = $1
               AND fc.is_active = TRUE
               AND c.parent_id IS NOT NULL
               AND c.deleted_at IS NULL
             ORDER BY c.is_default ASC, LOWER(c.name) ASC",
        )
        .bind(fund_id)
        .fetch_all(pool)
        .await
    }

    /// The system default root categories, alphabetical.
    pub async fn default_roots(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories
             WHERE is_default = TRUE AND parent_id IS NULL AND deleted_at IS NULL
             ORDER BY LOWER(name) ASC"
        );
        sqlx::query_as::<_, Category>(&query).fetch_all(pool).await
    }

    /// The direct children of a category, alphabetical.
    pub async fn children_of(pool: &PgPool, parent_id: DbId) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories
             WHERE parent_id = $1 AND deleted_at IS NULL
             ORDER BY LOWER(name) ASC"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(parent_id)
            .fetch_all(pool)
            .await
    }

    /// All default leaf categories annotated with the fund's subscription
    /// state, for the defaults-browser tree.
    pub async fn default_leaves_with_subscription(
        pool: &PgPool,
        fund_id: DbId,
    ) -> Result<Vec<CategoryWithSubscription>, sqlx::Error> {
        sqlx::query_as::<_, CategoryWithSubscription>(
            "SELECT c.id, c.name, c.description, c.parent_id, c.is_default,
                    COALESCE(fc.is_active, FALSE) AS is_subscribed
             FROM categories c
             LEFT JOIN fund_categories fc
                    ON fc.category_id = c.id AND fc.fund_id = $1
             WHERE c.is_default = TRUE
               AND c.parent_id IS NOT NULL
               AND c.deleted_at IS NULL
             ORDER BY LOWER(c.name) ASC",
        )
        .bind(fund_id)
        .fetch_all(pool)
        .await
    }
}
