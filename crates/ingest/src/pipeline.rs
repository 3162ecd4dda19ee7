//! Classify-and-materialize pipeline for inbound messages.
//!
//! One code path serves both deployment shapes: the synchronous API call
//! and the queued worker run the same steps, so a fund behaves identically
//! whichever mode is configured.

use sqlx::PgPool;

use fundmate_classifier::provider::{Classifier, ClassifyRequest};
use fundmate_core::category::{sort_for_prompt, CategoryOption};
use fundmate_core::message::{validate_extraction, Extraction, FAILURE_NO_AMOUNT};
use fundmate_core::types::DbId;
use fundmate_db::models::message::Message;
use fundmate_db::models::transaction::{CreateTransaction, Transaction};
use fundmate_db::repositories::{CategoryRepo, FundRepo, MessageRepo, TransactionRepo, UserRepo};

use crate::error::IngestError;

/// Result of running the classifier over a stored message.
#[derive(Debug)]
pub enum ProcessOutcome {
    /// The message is PROCESSED and linked to its transaction.
    Processed(Message),
    /// Terminal failure: the text carried no usable amount. The message is
    /// FAILED with the reason recorded and no transaction exists.
    Failed(Message),
}

/// Result of re-classifying an edited message.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The edit parsed; message and transaction reflect the new text.
    Applied(Message),
    /// The edit yielded no usable data; the stored message is untouched.
    Ignored(Message),
}

/// The category menu offered to the classifier for a fund: subscribed
/// leaves, fund-custom entries ahead of system defaults.
pub async fn category_options(
    pool: &PgPool,
    fund_id: DbId,
) -> Result<Vec<CategoryOption>, sqlx::Error> {
    let leaves = CategoryRepo::active_leaves_for_fund(pool, fund_id).await?;
    let mut options: Vec<CategoryOption> = leaves
        .into_iter()
        .map(|c| CategoryOption {
            id: c.id,
            name: c.name,
            description: c.description,
            is_default: c.is_default,
        })
        .collect();
    sort_for_prompt(&mut options);
    Ok(options)
}

/// Classify a stored message and materialize the outcome.
///
/// A result without an amount marks the message FAILED and returns
/// [`ProcessOutcome::Failed`]; classifier errors propagate so the caller
/// owns the retry policy. Reprocessing a message that already has a
/// transaction overwrites it instead of inserting a duplicate.
pub async fn process_message(
    pool: &PgPool,
    classifier: &dyn Classifier,
    message_id: DbId,
) -> Result<ProcessOutcome, IngestError> {
    let message = MessageRepo::find_by_id(pool, message_id)
        .await?
        .ok_or(IngestError::MessageNotFound(message_id))?;

    let request = ClassifyRequest {
        fund_id: Some(message.fund_id),
        message_id: Some(message.id),
        text: message.body.clone(),
        categories: category_options(pool, message.fund_id).await?,
    };

    let extraction = classifier.classify(pool, &request).await?;

    if let Err(err) = validate_extraction(&extraction) {
        return fail_terminal(pool, &message, &err.to_string()).await;
    }
    if !extraction.has_amount() {
        return fail_terminal(pool, &message, FAILURE_NO_AMOUNT).await;
    }

    let Some(transaction) = materialize(pool, &message, &message.body, &extraction).await? else {
        return fail_terminal(pool, &message, "Message author no longer exists").await;
    };

    let updated = MessageRepo::mark_processed(pool, message.id, None, &extraction, transaction.id)
        .await?
        .ok_or(IngestError::MessageNotFound(message.id))?;

    tracing::info!(
        message_id = message.id,
        transaction_id = transaction.id,
        "Message processed"
    );
    Ok(ProcessOutcome::Processed(updated))
}

/// Synchronous-mode wrapper: classifier failures degrade to a FAILED
/// message instead of propagating, so the HTTP request that posted the
/// message still succeeds with the message in its terminal state.
pub async fn process_message_sync(
    pool: &PgPool,
    classifier: &dyn Classifier,
    message_id: DbId,
) -> Result<ProcessOutcome, IngestError> {
    match process_message(pool, classifier, message_id).await {
        Err(IngestError::Classifier(err)) => {
            let reason = err.to_string();
            tracing::warn!(message_id, error = %reason, "Classifier unavailable; marking message failed");
            let failed = MessageRepo::mark_failed(pool, message_id, &reason)
                .await?
                .ok_or(IngestError::MessageNotFound(message_id))?;
            Ok(ProcessOutcome::Failed(failed))
        }
        other => other,
    }
}

/// Re-classify an edited message.
///
/// The new text is parsed before anything is stored: an edit that yields no
/// usable amount (or a classifier failure) leaves the message exactly as it
/// was, so a processed message never regresses to a dataless one.
pub async fn reclassify_message(
    pool: &PgPool,
    classifier: &dyn Classifier,
    message_id: DbId,
    new_text: &str,
) -> Result<UpdateOutcome, IngestError> {
    let message = MessageRepo::find_by_id(pool, message_id)
        .await?
        .ok_or(IngestError::MessageNotFound(message_id))?;

    let request = ClassifyRequest {
        fund_id: Some(message.fund_id),
        message_id: Some(message.id),
        text: new_text.to_string(),
        categories: category_options(pool, message.fund_id).await?,
    };

    let extraction = match classifier.classify(pool, &request).await {
        Ok(extraction) => extraction,
        Err(err) => {
            tracing::warn!(
                message_id = message.id,
                error = %err,
                "Edit classification failed; keeping stored message"
            );
            return Ok(UpdateOutcome::Ignored(message));
        }
    };

    if validate_extraction(&extraction).is_err() || !extraction.has_amount() {
        tracing::debug!(message_id = message.id, "Edit yielded no usable data; ignored");
        return Ok(UpdateOutcome::Ignored(message));
    }

    let Some(transaction) = materialize(pool, &message, new_text, &extraction).await? else {
        return Ok(UpdateOutcome::Ignored(message));
    };

    let updated =
        MessageRepo::mark_processed(pool, message.id, Some(new_text), &extraction, transaction.id)
            .await?
            .ok_or(IngestError::MessageNotFound(message.id))?;

    tracing::info!(
        message_id = message.id,
        transaction_id = transaction.id,
        "Message edit re-processed"
    );
    Ok(UpdateOutcome::Applied(updated))
}

/// Soft-delete a message, cascade to its linked transaction, and pull the
/// fund's activity pointer back to the newest surviving message.
pub async fn delete_message(pool: &PgPool, message_id: DbId) -> Result<(), IngestError> {
    let message = MessageRepo::find_by_id(pool, message_id)
        .await?
        .ok_or(IngestError::MessageNotFound(message_id))?;

    MessageRepo::soft_delete(pool, message.id).await?;

    if let Some(transaction) = TransactionRepo::find_by_message_id(pool, message.id).await? {
        TransactionRepo::soft_delete(pool, transaction.id).await?;
    }

    FundRepo::refresh_last_message(pool, message.fund_id).await?;

    tracing::info!(
        message_id = message.id,
        fund_id = message.fund_id,
        "Message deleted"
    );
    Ok(())
}

/// Update the message's existing transaction or create a fresh one.
///
/// The lookup by `message_id` keeps worker redelivery idempotent: a second
/// run overwrites instead of inserting a duplicate. Returns `None` when the
/// author row is gone and a new transaction cannot be attributed.
async fn materialize(
    pool: &PgPool,
    message: &Message,
    text: &str,
    extraction: &Extraction,
) -> Result<Option<Transaction>, IngestError> {
    if let Some(existing) = TransactionRepo::find_by_message_id(pool, message.id).await? {
        let updated = TransactionRepo::update_from_extraction(pool, existing.id, text, extraction)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        return Ok(Some(updated));
    }

    let Some(author) = UserRepo::find_by_id(pool, message.user_id).await? else {
        tracing::warn!(
            message_id = message.id,
            user_id = message.user_id,
            "Message author missing; no transaction materialized"
        );
        return Ok(None);
    };

    let created = TransactionRepo::create(
        pool,
        &CreateTransaction {
            fund_id: message.fund_id,
            user_id: message.user_id,
            user_name: author.display_name,
            message_id: Some(message.id),
            raw_prompt: text.to_string(),
            spend_value: extraction.spend_value,
            earn_value: extraction.earn_value,
            content: extraction.content.clone(),
            category_id: extraction.category_id,
            metadata: extraction.metadata.clone(),
            occurred_at: message.created_at,
        },
    )
    .await?;
    Ok(Some(created))
}

/// Mark a message FAILED with a terminal reason and wrap the updated row.
async fn fail_terminal(
    pool: &PgPool,
    message: &Message,
    reason: &str,
) -> Result<ProcessOutcome, IngestError> {
    tracing::warn!(
        message_id = message.id,
        reason,
        "Message classification yielded no transaction"
    );
    let failed = MessageRepo::mark_failed(pool, message.id, reason)
        .await?
        .ok_or(IngestError::MessageNotFound(message.id))?;
    Ok(ProcessOutcome::Failed(failed))
}
