//! Integration tests for the join-request tables.
//!
//! Verifies the pending-uniqueness partial index and the atomic decide
//! transition that the approval workflow is built on.

use sqlx::PgPool;
use fundmate_db::models::fund::CreateFund;
use fundmate_db::models::user::CreateUser;
use fundmate_db::repositories::{FundRepo, JoinRequestRepo, UserRepo};

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
        name: "Join Target".to_string(),
        fund_type: "shared".to_string(),
        owner_id,
        share_code: share_code.to_string(),
        description: None,
        open_dialog: true,
    }
}

async fn seed(pool: &PgPool, share_code: &str) -> (i64, i64, i64) {
    let owner = UserRepo::create(pool, &new_user(&format!("owner-{share_code}@example.com")))
        .await
        .unwrap();
    let requester = UserRepo::create(pool, &new_user(&format!("req-{share_code}@example.com")))
        .await
        .unwrap();
    let fund = FundRepo::create(pool, &new_fund(owner.id, share_code))
        .await
        .unwrap();
    (fund.id, owner.id, requester.id)
}

// ---------------------------------------------------------------------------
// Test: only one pending request per (fund, user)
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_pending_request_rejected_by_index(pool: PgPool) {
    let (fund_id, _owner_id, requester_id) = seed(&pool, "111222").await;

    JoinRequestRepo::create(&pool, fund_id, requester_id)
        .await
        .unwrap();
    let second = JoinRequestRepo::create(&pool, fund_id, requester_id).await;
    assert!(
        second.is_err(),
        "duplicate pending request should violate uq_fund_join_requests_pending"
    );
}

// ---------------------------------------------------------------------------
// Test: a decided request frees the pending slot
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_decided_request_allows_new_pending(pool: PgPool) {
    let (fund_id, owner_id, requester_id) = seed(&pool, "333444").await;

    let first = JoinRequestRepo::create(&pool, fund_id, requester_id)
        .await
        .unwrap();
    JoinRequestRepo::decide(&pool, first.id, "rejected", owner_id)
        .await
        .unwrap()
        .unwrap();

    // Rejection is terminal for the row but not for the user.
    let second = JoinRequestRepo::create(&pool, fund_id, requester_id)
        .await
        .unwrap();
    assert_ne!(second.id, first.id);
    assert_eq!(second.status, "pending");
}

// ---------------------------------------------------------------------------
// Test: decide is atomic and one-shot
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_decide_is_one_shot(pool: PgPool) {
    let (fund_id, owner_id, requester_id) = seed(&pool, "555666").await;

    let request = JoinRequestRepo::create(&pool, fund_id, requester_id)
        .await
        .unwrap();

    let approved = JoinRequestRepo::decide(&pool, request.id, "approved", owner_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(approved.status, "approved");
    assert_eq!(approved.reviewed_by, Some(owner_id));
    assert!(approved.reviewed_at.is_some());

    let again = JoinRequestRepo::decide(&pool, request.id, "rejected", owner_id)
        .await
        .unwrap();
    assert!(
        again.is_none(),
        "a decided request must not transition a second time"
    );

    // The terminal state survives the rejected second attempt.
    let reloaded = JoinRequestRepo::find_by_id(&pool, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, "approved");
}

// ---------------------------------------------------------------------------
// Test: find_pending and find_latest_approved
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pending_and_approved_lookups(pool: PgPool) {
    let (fund_id, owner_id, requester_id) = seed(&pool, "777888").await;

    assert!(JoinRequestRepo::find_pending(&pool, fund_id, requester_id)
        .await
        .unwrap()
        .is_none());

    let request = JoinRequestRepo::create(&pool, fund_id, requester_id)
        .await
        .unwrap();
    let pending = JoinRequestRepo::find_pending(&pool, fund_id, requester_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pending.id, request.id);

    JoinRequestRepo::decide(&pool, request.id, "approved", owner_id)
        .await
        .unwrap()
        .unwrap();
    assert!(JoinRequestRepo::find_pending(&pool, fund_id, requester_id)
        .await
        .unwrap()
        .is_none());

    let approved = JoinRequestRepo::find_latest_approved(&pool, fund_id, requester_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(approved.id, request.id);
}

// ---------------------------------------------------------------------------
// Test: listing is pending first
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_listing_pending_first(pool: PgPool) {
    let (fund_id, owner_id, requester_id) = seed(&pool, "999000").await;
    let other = UserRepo::create(&pool, &new_user("other@example.com"))
        .await
        .unwrap();

    let decided = JoinRequestRepo::create(&pool, fund_id, requester_id)
        .await
        .unwrap();
    JoinRequestRepo::decide(&pool, decided.id, "rejected", owner_id)
        .await
        .unwrap()
        .unwrap();
    let open = JoinRequestRepo::create(&pool, fund_id, other.id)
        .await
        .unwrap();

    let listed = JoinRequestRepo::list_by_fund(&pool, fund_id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, open.id, "pending requests sort before decided ones");
    assert_eq!(listed[0].status, "pending");
    assert_eq!(listed[1].status, "rejected");
    assert_eq!(listed[1].email, "req-999000@example.com");
}
