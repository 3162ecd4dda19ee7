//! HTTP-level integration tests for member management and the join-request
//! workflow, including the role policy (immutable owner row, owner-managed
//! admins) and membership repair from a prior approval.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_fund, delete_auth, get_auth, patch_json_auth, post_auth, post_json_auth,
    register,
};
use sqlx::PgPool;

/// Owner + fund + a second registered user, the staple fixture here.
async fn fund_with_outsider(
    app: &axum::Router,
) -> (String, String, i64, i64) {
    let (owner_token, _) = register(app, "owner@test.com", "Owner").await;
    let (other_token, other_id) = register(app, "other@test.com", "Other").await;
    let fund = create_fund(app, &owner_token, "Shared").await;
    let fund_id = fund["id"].as_i64().unwrap();
    (owner_token, other_token, other_id, fund_id)
}

// ---------------------------------------------------------------------------
// Direct member management
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_add_and_list_members(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (owner_token, _, other_id, fund_id) = fund_with_outsider(&app).await;

    let response = post_json_auth(
        &app,
        &format!("/api/funds/{fund_id}/members"),
        &owner_token,
        serde_json::json!({ "user_id": other_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "member");

    let response = get_auth(&app, &format!("/api/funds/{fund_id}/members"), &owner_token).await;
    let json = body_json(response).await;
    let members = json["data"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    // Joined user details ride along.
    assert!(members.iter().any(|m| m["email"] == "other@test.com"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_add_member_rejects_duplicates_and_ghosts(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (owner_token, _, other_id, fund_id) = fund_with_outsider(&app).await;

    post_json_auth(
        &app,
        &format!("/api/funds/{fund_id}/members"),
        &owner_token,
        serde_json::json!({ "user_id": other_id }),
    )
    .await;

    let dup = post_json_auth(
        &app,
        &format!("/api/funds/{fund_id}/members"),
        &owner_token,
        serde_json::json!({ "user_id": other_id }),
    )
    .await;
    assert_eq!(dup.status(), StatusCode::CONFLICT);

    let ghost = post_json_auth(
        &app,
        &format!("/api/funds/{fund_id}/members"),
        &owner_token,
        serde_json::json!({ "user_id": 999_999 }),
    )
    .await;
    assert_eq!(ghost.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_owner_role_is_never_assignable(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (owner_token, _, other_id, fund_id) = fund_with_outsider(&app).await;

    let response = post_json_auth(
        &app,
        &format!("/api/funds/{fund_id}/members"),
        &owner_token,
        serde_json::json!({ "user_id": other_id, "role": "owner" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_role_policy_on_updates(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (owner_token, other_token, other_id, fund_id) = fund_with_outsider(&app).await;
    let (_, third_id) = register(&app, "third@test.com", "Third").await;

    for id in [other_id, third_id] {
        post_json_auth(
            &app,
            &format!("/api/funds/{fund_id}/members"),
            &owner_token,
            serde_json::json!({ "user_id": id }),
        )
        .await;
    }

    // Owner promotes `other` to admin.
    let response = patch_json_auth(
        &app,
        &format!("/api/funds/{fund_id}/members/{other_id}"),
        &owner_token,
        serde_json::json!({ "role": "admin" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["role"], "admin");

    // The new admin may not touch another admin's role, nor the owner row.
    let response = patch_json_auth(
        &app,
        &format!("/api/funds/{fund_id}/members/{other_id}"),
        &other_token,
        serde_json::json!({ "role": "member" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Granting the admin role is likewise reserved to the owner.
    let response = patch_json_auth(
        &app,
        &format!("/api/funds/{fund_id}/members/{third_id}"),
        &other_token,
        serde_json::json!({ "role": "admin" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_role_of_removed_member_is_not_found(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (owner_token, _, other_id, fund_id) = fund_with_outsider(&app).await;

    post_json_auth(
        &app,
        &format!("/api/funds/{fund_id}/members"),
        &owner_token,
        serde_json::json!({ "user_id": other_id }),
    )
    .await;
    delete_auth(
        &app,
        &format!("/api/funds/{fund_id}/members/{other_id}"),
        &owner_token,
    )
    .await;

    // A missing target is a 404 about the member, never a 403.
    let response = patch_json_auth(
        &app,
        &format!("/api/funds/{fund_id}/members/{other_id}"),
        &owner_token,
        serde_json::json!({ "role": "admin" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_remove_member_policy(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (owner_token, owner_id) = register(&app, "owner@test.com", "Owner").await;
    let (other_token, other_id) = register(&app, "other@test.com", "Other").await;
    let fund = create_fund(&app, &owner_token, "Shared").await;
    let fund_id = fund["id"].as_i64().unwrap();

    post_json_auth(
        &app,
        &format!("/api/funds/{fund_id}/members"),
        &owner_token,
        serde_json::json!({ "user_id": other_id, "role": "admin" }),
    )
    .await;

    // The owner row can never be removed, not even by the owner.
    let response = delete_auth(
        &app,
        &format!("/api/funds/{fund_id}/members/{owner_id}"),
        &owner_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // An admin cannot remove another admin; the owner can.
    let response = delete_auth(
        &app,
        &format!("/api/funds/{fund_id}/members/{other_id}"),
        &other_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(
        &app,
        &format!("/api/funds/{fund_id}/members/{other_id}"),
        &owner_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// Join requests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_join_request_approval_flow(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (owner_token, other_token, _, fund_id) = fund_with_outsider(&app).await;

    let response = post_auth(&app, &format!("/api/funds/{fund_id}/join-requests"), &other_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let request_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    // Re-requesting while pending returns the same record, no duplicate.
    let response = post_auth(&app, &format!("/api/funds/{fund_id}/join-requests"), &other_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["id"], request_id);

    // Only owner/admin can see the queue.
    let response = get_auth(&app, &format!("/api/funds/{fund_id}/join-requests"), &other_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(&app, &format!("/api/funds/{fund_id}/join-requests"), &owner_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["status"], "pending");

    let response = post_auth(
        &app,
        &format!("/api/funds/{fund_id}/join-requests/{request_id}/approve"),
        &owner_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "approved");

    // Approval grants plain membership.
    let response = get_auth(&app, &format!("/api/funds/{fund_id}/membership"), &other_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_member"], true);
    assert_eq!(json["data"]["role"], "member");

    // A decided request cannot be decided again.
    let response = post_auth(
        &app,
        &format!("/api/funds/{fund_id}/join-requests/{request_id}/reject"),
        &owner_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_approval_keeps_role_of_directly_added_member(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (owner_token, other_token, other_id, fund_id) = fund_with_outsider(&app).await;

    let response = post_auth(&app, &format!("/api/funds/{fund_id}/join-requests"), &other_token).await;
    let request_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    // While the request sits pending, the owner adds the user as admin.
    post_json_auth(
        &app,
        &format!("/api/funds/{fund_id}/members"),
        &owner_token,
        serde_json::json!({ "user_id": other_id, "role": "admin" }),
    )
    .await;

    let response = post_auth(
        &app,
        &format!("/api/funds/{fund_id}/join-requests/{request_id}/approve"),
        &owner_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "approved");

    // Approval does not demote the existing membership.
    let response = get_auth(&app, &format!("/api/funds/{fund_id}/membership"), &other_token).await;
    assert_eq!(body_json(response).await["data"]["role"], "admin");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_join_request_rejection_is_terminal(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (owner_token, other_token, _, fund_id) = fund_with_outsider(&app).await;

    let response = post_auth(&app, &format!("/api/funds/{fund_id}/join-requests"), &other_token).await;
    let request_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_auth(
        &app,
        &format!("/api/funds/{fund_id}/join-requests/{request_id}/reject"),
        &owner_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "rejected");

    let response = get_auth(&app, &format!("/api/funds/{fund_id}/membership"), &other_token).await;
    assert_eq!(body_json(response).await["data"]["is_member"], false);

    // A rejected user may ask again with a fresh request.
    let response = post_auth(&app, &format!("/api/funds/{fund_id}/join-requests"), &other_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_join_request_guards(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (owner_token, other_token, other_id, fund_id) = fund_with_outsider(&app).await;

    // The owner cannot request to join their own fund.
    let response = post_auth(&app, &format!("/api/funds/{fund_id}/join-requests"), &owner_token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Existing members cannot request either.
    post_json_auth(
        &app,
        &format!("/api/funds/{fund_id}/members"),
        &owner_token,
        serde_json::json!({ "user_id": other_id }),
    )
    .await;
    let response = post_auth(&app, &format!("/api/funds/{fund_id}/join-requests"), &other_token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_removed_member_rejoins_from_prior_approval(pool: PgPool) {
    let (app, _) = common::build_test_app(pool);
    let (owner_token, other_token, other_id, fund_id) = fund_with_outsider(&app).await;

    let response = post_auth(&app, &format!("/api/funds/{fund_id}/join-requests"), &other_token).await;
    let request_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    post_auth(
        &app,
        &format!("/api/funds/{fund_id}/join-requests/{request_id}/approve"),
        &owner_token,
    )
    .await;

    delete_auth(
        &app,
        &format!("/api/funds/{fund_id}/members/{other_id}"),
        &owner_token,
    )
    .await;

    // The surviving approval repairs the membership without a new review.
    let response = post_auth(&app, &format!("/api/funds/{fund_id}/join-requests"), &other_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "approved");

    let response = get_auth(&app, &format!("/api/funds/{fund_id}/membership"), &other_token).await;
    assert_eq!(body_json(response).await["data"]["is_member"], true);
}
