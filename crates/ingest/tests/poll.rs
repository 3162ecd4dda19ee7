//! Integration tests for the parse job poller's claim-and-retry policy.

use assert_matches::assert_matches;
use sqlx::PgPool;

use fundmate_classifier::mock::MockClassifier;
use fundmate_core::message::Extraction;
use fundmate_db::models::fund::CreateFund;
use fundmate_db::models::message::CreateMessage;
use fundmate_db::models::parse_job::status;
use fundmate_db::models::user::CreateUser;
use fundmate_db::repositories::{FundRepo, MessageRepo, ParseJobRepo, TransactionRepo, UserRepo};
use fundmate_ingest::poll::process_next_job;
use fundmate_ingest::retry::MAX_PARSE_ATTEMPTS;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_user(email: &str) -> CreateUser {
    CreateUser {
        email: email.to_string(),
        display_name: format!("User {email}"),
        password_hash: "$argon2id$stub".to_string(),
    }
}

fn new_fund(owner_id: i64, share_code: &str) -> CreateFund {
    CreateFund {
        name: "Poller".to_string(),
        fund_type: "personal".to_string(),
        owner_id,
        share_code: share_code.to_string(),
        description: None,
        open_dialog: true,
    }
}

/// Seed a fund, a message, and its queued parse job. Returns
/// `(message_id, job_id)`.
async fn seed_job(pool: &PgPool, share_code: &str, body: &str) -> (i64, i64) {
    let owner = UserRepo::create(pool, &new_user(&format!("owner-{share_code}@example.com")))
        .await
        .unwrap();
    let fund = FundRepo::create(pool, &new_fund(owner.id, share_code))
        .await
        .unwrap();
    let message = MessageRepo::create(
        pool,
        &CreateMessage {
            fund_id: fund.id,
            user_id: owner.id,
            body: body.to_string(),
        },
    )
    .await
    .unwrap();
    let job = ParseJobRepo::enqueue(pool, message.id, MAX_PARSE_ATTEMPTS)
        .await
        .unwrap();
    (message.id, job.id)
}

/// Make a backed-off job due immediately.
async fn make_due(pool: &PgPool, job_id: i64) {
    sqlx::query("UPDATE parse_jobs SET run_after = NOW() WHERE id = $1")
        .bind(job_id)
        .execute(pool)
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_queue_is_a_noop(pool: PgPool) {
    let classifier = MockClassifier::new();
    let worked = process_next_job(&pool, &classifier).await.unwrap();
    assert!(!worked);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_successful_job_completes(pool: PgPool) {
    let (message_id, job_id) = seed_job(&pool, "POLL0001", "coffee 4").await;

    let classifier = MockClassifier::new();
    classifier
        .push_extraction(Extraction {
            spend_value: Some(4.0),
            earn_value: None,
            content: "coffee".to_string(),
            category_id: None,
            metadata: None,
        })
        .await;

    let worked = process_next_job(&pool, &classifier).await.unwrap();
    assert!(worked);

    let job = ParseJobRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status, status::DONE);
    assert_eq!(job.attempts, 1);
    assert!(job.completed_at.is_some());

    let message = MessageRepo::find_by_id(&pool, message_id).await.unwrap().unwrap();
    assert_eq!(message.status, "processed");
    assert!(message.transaction_id.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_terminal_no_amount_still_completes_job(pool: PgPool) {
    let (message_id, job_id) = seed_job(&pool, "POLL0002", "hello everyone").await;

    let classifier = MockClassifier::new();
    classifier
        .push_extraction(Extraction {
            spend_value: None,
            earn_value: None,
            content: "greeting".to_string(),
            category_id: None,
            metadata: None,
        })
        .await;

    process_next_job(&pool, &classifier).await.unwrap();

    // A dataless message is a terminal outcome, not a provider fault, so
    // the job must not burn retries on it.
    let job = ParseJobRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status, status::DONE);

    let message = MessageRepo::find_by_id(&pool, message_id).await.unwrap().unwrap();
    assert_eq!(message.status, "failed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_classifier_error_schedules_retry(pool: PgPool) {
    let (message_id, job_id) = seed_job(&pool, "POLL0003", "lunch 12").await;

    let classifier = MockClassifier::new();
    classifier.push_failure("provider down").await;

    let worked = process_next_job(&pool, &classifier).await.unwrap();
    assert!(worked);

    let job = ParseJobRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status, status::QUEUED);
    assert_eq!(job.attempts, 1);
    assert!(job.last_error.unwrap().contains("provider down"));

    // The backoff keeps it invisible until run_after passes.
    let worked = process_next_job(&pool, &classifier).await.unwrap();
    assert!(!worked, "a backed-off job must not be reclaimed immediately");

    let message = MessageRepo::find_by_id(&pool, message_id).await.unwrap().unwrap();
    assert_eq!(message.status, "pending");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_exhausted_job_fails_message(pool: PgPool) {
    let (message_id, job_id) = seed_job(&pool, "POLL0004", "dinner 30").await;

    let classifier = MockClassifier::new();
    for _ in 0..MAX_PARSE_ATTEMPTS {
        classifier.push_failure("still down").await;
        make_due(&pool, job_id).await;
        let worked = process_next_job(&pool, &classifier).await.unwrap();
        assert!(worked);
    }

    let job = ParseJobRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status, status::FAILED);
    assert_eq!(job.attempts, MAX_PARSE_ATTEMPTS);
    assert!(job.completed_at.is_some());

    let message = MessageRepo::find_by_id(&pool, message_id).await.unwrap().unwrap();
    assert_eq!(message.status, "failed");
    assert!(
        message.failure_reason.unwrap().contains("still down"),
        "exhaustion must record the last error on the message"
    );

    // Nothing left to claim.
    let worked = process_next_job(&pool, &classifier).await.unwrap();
    assert!(!worked);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_job_for_deleted_message_closes_quietly(pool: PgPool) {
    let (message_id, job_id) = seed_job(&pool, "POLL0005", "coffee 4").await;
    MessageRepo::soft_delete(&pool, message_id).await.unwrap();

    let classifier = MockClassifier::new();
    let worked = process_next_job(&pool, &classifier).await.unwrap();
    assert!(worked);

    let job = ParseJobRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status, status::DONE, "a job for a gone message is closed, not failed");
    assert_matches!(
        TransactionRepo::find_by_message_id(&pool, message_id).await,
        Ok(None)
    );
}
