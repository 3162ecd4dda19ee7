//! Parse-job queue model.

use fundmate_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Status literals for `parse_jobs.status`. No magic strings in queries.
pub mod status {
    pub const QUEUED: &str = "queued";
    pub const RUNNING: &str = "running";
    pub const DONE: &str = "done";
    pub const FAILED: &str = "failed";
}

/// A queued unit of asynchronous classification work.
///
/// `run_after` implements the retry backoff: a retried job is requeued
/// with a future `run_after` and is invisible to `claim_next` until then.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ParseJob {
    pub id: DbId,
    pub message_id: DbId,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub run_after: Timestamp,
    pub last_error: Option<String>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ParseJob {
    /// Whether the job has consumed its final attempt.
    pub fn is_last_attempt(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}
