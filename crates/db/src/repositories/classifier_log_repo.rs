//! Repository for the `classifier_logs` audit table.

use sqlx::PgPool;
use fundmate_core::types::DbId;

use crate::models::classifier_log::{ClassifierLog, CreateClassifierLog};

const COLUMNS: &str = "\
    id, model, request, response, error_message, latency_ms, \
    fund_id, message_id, created_at, updated_at";

/// Append-only audit log of classifier invocations.
pub struct ClassifierLogRepo;

impl ClassifierLogRepo {
    /// Record one classifier call.
    pub async fn create(
        pool: &PgPool,
        input: &CreateClassifierLog,
    ) -> Result<ClassifierLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO classifier_logs
                (model, request, response, error_message, latency_ms, fund_id, message_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClassifierLog>(&query)
            .bind(&input.model)
            .bind(&input.request)
            .bind(&input.response)
            .bind(&input.error_message)
            .bind(input.latency_ms)
            .bind(input.fund_id)
            .bind(input.message_id)
            .fetch_one(pool)
            .await
    }

    /// The most recent log entries for a fund, newest first.
    pub async fn recent_for_fund(
        pool: &PgPool,
        fund_id: DbId,
        limit: i64,
    ) -> Result<Vec<ClassifierLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM classifier_logs
             WHERE fund_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, ClassifierLog>(&query)
            .bind(fund_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
