//! Repository for the `parse_jobs` queue table.
//!
//! Status literals come from `models::parse_job::status`; no magic strings
//! in the transition queries.

use sqlx::PgPool;
use fundmate_core::types::DbId;

use crate::models::parse_job::{status, ParseJob};

const COLUMNS: &str = "\
    id, message_id, status, attempts, max_attempts, run_after, \
    last_error, started_at, completed_at, created_at, updated_at";

/// Provides queue operations for asynchronous message classification.
pub struct ParseJobRepo;

impl ParseJobRepo {
    /// Enqueue a classification job for a message, runnable immediately.
    pub async fn enqueue(
        pool: &PgPool,
        message_id: DbId,
        max_attempts: i32,
    ) -> Result<ParseJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO parse_jobs (message_id, max_attempts)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ParseJob>(&query)
            .bind(message_id)
            .bind(max_attempts)
            .fetch_one(pool)
            .await
    }

    /// Find a job by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ParseJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM parse_jobs WHERE id = $1");
        sqlx::query_as::<_, ParseJob>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The most recent job for a message, if any.
    pub async fn find_latest_for_message(
        pool: &PgPool,
        message_id: DbId,
    ) -> Result<Option<ParseJob>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM parse_jobs
             WHERE message_id = $1
             ORDER BY id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, ParseJob>(&query)
            .bind(message_id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically claim the next due job, bumping its attempt counter.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` to prevent double-dispatch when
    /// multiple workers poll the same table. Jobs whose `run_after` is in
    /// the future are invisible until their backoff elapses.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<ParseJob>, sqlx::Error> {
        let query = format!(
            "UPDATE parse_jobs
             SET status = $1, attempts = attempts + 1, started_at = NOW()
             WHERE id = (
                 SELECT id FROM parse_jobs
                 WHERE status = $2 AND run_after <= NOW()
                 ORDER BY run_after ASC, id ASC
                 LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ParseJob>(&query)
            .bind(status::RUNNING)
            .bind(status::QUEUED)
            .fetch_optional(pool)
            .await
    }

    /// Mark a claimed job as successfully finished.
    pub async fn complete(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE parse_jobs
             SET status = $2, completed_at = NOW(), last_error = NULL
             WHERE id = $1",
        )
        .bind(id)
        .bind(status::DONE)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Requeue a claimed job to run again after a backoff delay.
    pub async fn retry_later(
        pool: &PgPool,
        id: DbId,
        delay_secs: i64,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE parse_jobs
             SET status = $2,
                 run_after = NOW() + make_interval(secs => $3::DOUBLE PRECISION),
                 last_error = $4
             WHERE id = $1",
        )
        .bind(id)
        .bind(status::QUEUED)
        .bind(delay_secs as f64)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a claimed job as terminally failed with its last error.
    pub async fn fail(pool: &PgPool, id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE parse_jobs
             SET status = $2, completed_at = NOW(), last_error = $3
             WHERE id = $1",
        )
        .bind(id)
        .bind(status::FAILED)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }
}
