//! Repository for the `fund_categories` subscription table.

use sqlx::PgPool;
use fundmate_core::types::DbId;

use crate::models::fund_category::FundCategory;

const COLUMNS: &str = "id, fund_id, category_id, is_active, created_at, updated_at";

/// Provides subscription operations linking funds to categories.
///
/// Subscription rows are never deleted, only toggled, so the
/// (fund, category) pair keeps a stable identity across unsubscribes.
pub struct FundCategoryRepo;

impl FundCategoryRepo {
    /// Find the subscription row for a (fund, category) pair, active or not.
    pub async fn find(
        pool: &PgPool,
        fund_id: DbId,
        category_id: DbId,
    ) -> Result<Option<FundCategory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM fund_categories WHERE fund_id = $1 AND category_id = $2"
        );
        sqlx::query_as::<_, FundCategory>(&query)
            .bind(fund_id)
            .bind(category_id)
            .fetch_optional(pool)
            .await
    }

    /// Subscribe a fund to a category, reactivating an inactive row if one
    /// exists.
    pub async fn upsert_active(
        pool: &PgPool,
        fund_id: DbId,
        category_id: DbId,
    ) -> Result<FundCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO fund_categories (fund_id, category_id)
             VALUES ($1, $2)
             ON CONFLICT (fund_id, category_id)
             DO UPDATE SET is_active = TRUE
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FundCategory>(&query)
            .bind(fund_id)
            .bind(category_id)
            .fetch_one(pool)
            .await
    }

    /// Deactivate a subscription. Returns `true` if a row for the pair
    /// exists, whatever its previous state.
    pub async fn deactivate(
        pool: &PgPool,
        fund_id: DbId,
        category_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE fund_categories SET is_active = FALSE
             WHERE fund_id = $1 AND category_id = $2",
        )
        .bind(fund_id)
        .bind(category_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Subscribe a fund to a batch of categories in one statement.
    ///
    /// Creates missing rows and reactivates inactive ones; rows already
    /// active are left untouched. Returns the number of rows created or
    /// reactivated, which the conditional `DO UPDATE` keeps distinct from
    /// the batch size.
    pub async fn subscribe_many(
        pool: &PgPool,
        fund_id: DbId,
        category_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        if category_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "INSERT INTO fund_categories (fund_id, category_id)
             SELECT $1, unnest($2::BIGINT[])
             ON CONFLICT (fund_id, category_id)
             DO UPDATE SET is_active = TRUE
             WHERE fund_categories.is_active = FALSE",
        )
        .bind(fund_id)
        .bind(category_ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
