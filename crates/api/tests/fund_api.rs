//! HTTP-level integration tests for fund CRUD, share-code lookup, and the
//! activity-sorted fund listing.

mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use common::{
    body_json, create_fund, delete_auth, get_auth, patch_json_auth, post_json_auth, register,
};
use fundmate_api::error::AppError;
use fundmate_api::handlers::funds::create_with_share_code;
use fundmate_core::error::CoreError;
use fundmate_core::fund::{ScriptedShareCodes, SHARE_CODE_MAX_ATTEMPTS};
use fundmate_db::models::fund::CreateFund;
use sqlx::PgPool;

fn new_fund(owner_id: i64, name: &str) -> CreateFund {
    CreateFund {
        name: name.to_string(),
        fund_type: "shared".to_string(),
        owner_id,
        share_code: String::new(),
        description: None,
        open_dialog: true,
    }
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_fund_allocates_share_code(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (token, user_id) = register(&app, "owner@test.com", "Owner").await;

    let fund = create_fund(&app, &token, "Household").await;

    assert_eq!(fund["name"], "Household");
    assert_eq!(fund["owner_id"], user_id);
    let code = fund["share_code"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_fund_makes_creator_owner_member(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (token, _) = register(&app, "owner@test.com", "Owner").await;

    let fund = create_fund(&app, &token, "Household").await;
    let fund_id = fund["id"].as_i64().unwrap();

    let response = get_auth(&app, &format!("/api/funds/{fund_id}/membership"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_member"], true);
    assert_eq!(json["data"]["role"], "owner");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_fund_subscribes_default_leaves(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (token, _) = register(&app, "owner@test.com", "Owner").await;

    let fund = create_fund(&app, &token, "Household").await;
    let fund_id = fund["id"].as_i64().unwrap();

    // The seeded taxonomy has 32 default leaves, all active for a new fund.
    let response = get_auth(&app, &format!("/api/funds/{fund_id}/categories"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 32);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_fund_rejects_bad_input(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (token, _) = register(&app, "owner@test.com", "Owner").await;

    let response =
        post_json_auth(&app, "/api/funds", &token, serde_json::json!({ "name": "  " })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        &app,
        "/api/funds",
        &token,
        serde_json::json!({ "name": "Ok", "fund_type": "imaginary" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Share-code allocation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_allocation_skips_taken_code(pool: PgPool) {
    let (app, _) = common::build_test_app(pool.clone());
    let (_, user_id) = register(&app, "owner@test.com", "Owner").await;

    let mut first = ScriptedShareCodes::new(["111111"]);
    let taken = create_with_share_code(&pool, &mut first, new_fund(user_id, "First"))
        .await
        .unwrap();
    assert_eq!(taken.share_code.as_deref(), Some("111111"));

    // The colliding candidate is rejected and the loop moves on.
    let mut second = ScriptedShareCodes::new(["111111", "222222"]);
    let fund = create_with_share_code(&pool, &mut second, new_fund(user_id, "Second"))
        .await
        .unwrap();
    assert_eq!(fund.share_code.as_deref(), Some("222222"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_allocation_exhaustion_is_conflict(pool: PgPool) {
    let (app, _) = common::build_test_app(pool.clone());
    let (_, user_id) = register(&app, "owner@test.com", "Owner").await;

    let mut first = ScriptedShareCodes::new(["111111"]);
    create_with_share_code(&pool, &mut first, new_fund(user_id, "First"))
        .await
        .unwrap();

    // The scripted source repeats its last code, so every attempt collides.
    let mut stuck = ScriptedShareCodes::new(["111111"]);
    let err = create_with_share_code(&pool, &mut stuck, new_fund(user_id, "Doomed"))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        AppError::Core(CoreError::ShareCodeExhausted { attempts }) if attempts == SHARE_CODE_MAX_ATTEMPTS
    );
}

// ---------------------------------------------------------------------------
// Lookup by share code
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lookup_by_share_code(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (token, _) = register(&app, "owner@test.com", "Owner").await;
    let fund = create_fund(&app, &token, "Household").await;
    let code = fund["share_code"].as_str().unwrap();

    let (other_token, _) = register(&app, "other@test.com", "Other").await;
    let response = get_auth(
        &app,
        &format!("/api/funds/lookup?share_code={code}"),
        &other_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Public info only: name and member count, no share code echo.
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Household");
    assert_eq!(json["data"]["member_count"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lookup_miss_is_plain_404(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (token, _) = register(&app, "owner@test.com", "Owner").await;

    let response = get_auth(&app, "/api/funds/lookup?share_code=000000", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let malformed = get_auth(&app, "/api/funds/lookup?share_code=12ab", &token).await;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_funds_sorted_by_activity(pool: PgPool) {
    let (app, classifier) = common::build_test_app(pool);
    let (token, _) = register(&app, "owner@test.com", "Owner").await;

    let first = create_fund(&app, &token, "First").await;
    let second = create_fund(&app, &token, "Second").await;
    let first_id = first["id"].as_i64().unwrap();
    let second_id = second["id"].as_i64().unwrap();

    // Posting into the older fund moves it to the top.
    classifier
        .push_extraction(fundmate_core::message::Extraction {
            spend_value: Some(5.0),
            earn_value: None,
            content: "coffee".to_string(),
            category_id: None,
            metadata: None,
        })
        .await;
    let response = post_json_auth(
        &app,
        &format!("/api/funds/{first_id}/messages"),
        &token,
        serde_json::json!({ "body": "coffee 5" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(&app, "/api/funds", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![first_id, second_id]);
    assert_eq!(json["pagination"]["total"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_funds_paginates(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (token, _) = register(&app, "owner@test.com", "Owner").await;
    for i in 0..3 {
        create_fund(&app, &token, &format!("Fund {i}")).await;
    }

    let response = get_auth(&app, "/api/funds?page=2&per_page=2", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["pagination"]["page"], 2);
    assert_eq!(json["pagination"]["per_page"], 2);
    assert_eq!(json["pagination"]["total"], 3);
}

// ---------------------------------------------------------------------------
// Access control and mutation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_fund_detail_is_member_only(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (owner_token, _) = register(&app, "owner@test.com", "Owner").await;
    let fund = create_fund(&app, &owner_token, "Private").await;
    let fund_id = fund["id"].as_i64().unwrap();

    let (outsider_token, _) = register(&app, "outsider@test.com", "Outsider").await;
    let response = get_auth(&app, &format!("/api/funds/{fund_id}"), &outsider_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Membership status never 403s; "not a member" is the answer.
    let response = get_auth(
        &app,
        &format!("/api/funds/{fund_id}/membership"),
        &outsider_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_member"], false);
    assert!(json["data"]["role"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_fund_requires_admin_or_owner(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (owner_token, _) = register(&app, "owner@test.com", "Owner").await;
    let fund = create_fund(&app, &owner_token, "Before").await;
    let fund_id = fund["id"].as_i64().unwrap();

    let response = patch_json_auth(
        &app,
        &format!("/api/funds/{fund_id}"),
        &owner_token,
        serde_json::json!({ "name": "After", "open_dialog": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "After");
    assert_eq!(json["data"]["open_dialog"], false);

    let (outsider_token, _) = register(&app, "outsider@test.com", "Outsider").await;
    let response = patch_json_auth(
        &app,
        &format!("/api/funds/{fund_id}"),
        &outsider_token,
        serde_json::json!({ "name": "Hijacked" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_fund_is_owner_only(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (owner_token, _) = register(&app, "owner@test.com", "Owner").await;
    let (member_token, member_id) = register(&app, "member@test.com", "Member").await;

    let fund = create_fund(&app, &owner_token, "Doomed").await;
    let fund_id = fund["id"].as_i64().unwrap();

    let response = post_json_auth(
        &app,
        &format!("/api/funds/{fund_id}/members"),
        &owner_token,
        serde_json::json!({ "user_id": member_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = delete_auth(&app, &format!("/api/funds/{fund_id}"), &member_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(&app, &format!("/api/funds/{fund_id}"), &owner_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Soft-deleted funds are gone from the API surface.
    let response = get_auth(&app, &format!("/api/funds/{fund_id}"), &owner_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
