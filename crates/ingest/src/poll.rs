//! Parse job poller.
//!
//! Claims due jobs one at a time (`FOR UPDATE SKIP LOCKED` keeps multiple
//! workers from colliding), runs the pipeline, and applies the retry
//! policy: classifier errors requeue with exponential backoff, exhausted
//! jobs fail terminally and the message is marked FAILED.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use fundmate_classifier::provider::Classifier;
use fundmate_db::repositories::{MessageRepo, ParseJobRepo};

use crate::error::IngestError;
use crate::pipeline;
use crate::retry;

/// Default delay between queue polls.
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Claim and run at most one due parse job.
///
/// Returns `Ok(false)` when nothing was due. Classifier failures are
/// absorbed into the retry policy; only infrastructure errors propagate.
pub async fn process_next_job(
    pool: &PgPool,
    classifier: &dyn Classifier,
) -> Result<bool, sqlx::Error> {
    let Some(job) = ParseJobRepo::claim_next(pool).await? else {
        return Ok(false);
    };

    match pipeline::process_message(pool, classifier, job.message_id).await {
        Ok(_) => {
            ParseJobRepo::complete(pool, job.id).await?;
        }
        Err(IngestError::MessageNotFound(_)) => {
            // The message was deleted while the job sat in the queue.
            ParseJobRepo::complete(pool, job.id).await?;
            tracing::debug!(
                job_id = job.id,
                message_id = job.message_id,
                "Message gone before processing; job closed"
            );
        }
        Err(IngestError::Classifier(err)) => {
            let reason = err.to_string();
            if job.is_last_attempt() {
                ParseJobRepo::fail(pool, job.id, &reason).await?;
                MessageRepo::mark_failed(pool, job.message_id, &reason).await?;
                tracing::warn!(
                    job_id = job.id,
                    message_id = job.message_id,
                    attempts = job.attempts,
                    error = %reason,
                    "Parse job exhausted; message marked failed"
                );
            } else {
                let delay_secs = retry::backoff_delay_secs(job.attempts);
                ParseJobRepo::retry_later(pool, job.id, delay_secs, &reason).await?;
                tracing::warn!(
                    job_id = job.id,
                    message_id = job.message_id,
                    attempt = job.attempts,
                    delay_secs,
                    error = %reason,
                    "Parse job failed; retry scheduled"
                );
            }
        }
        Err(IngestError::Database(err)) => return Err(err),
    }

    Ok(true)
}

/// Run the parse job polling loop until `cancel` is triggered.
///
/// The poll cadence comes from `WORKER_POLL_INTERVAL_MS` (default 1000).
/// Each tick drains every due job before sleeping again.
pub async fn run(pool: PgPool, classifier: Arc<dyn Classifier>, cancel: CancellationToken) {
    let poll_interval_ms: u64 = std::env::var("WORKER_POLL_INTERVAL_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_POLL_INTERVAL_MS);

    tracing::info!(poll_interval_ms, "Parse job poller started");

    let mut interval = tokio::time::interval(Duration::from_millis(poll_interval_ms));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Parse job poller stopping");
                break;
            }
            _ = interval.tick() => {
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    match process_next_job(&pool, classifier.as_ref()).await {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => {
                            tracing::error!(error = %e, "Parse job poll failed");
                            break;
                        }
                    }
                }
            }
        }
    }
}
