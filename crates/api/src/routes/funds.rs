//! Route definitions for the `/funds` resource and its nested sub-resources
//! (members, join requests, categories, messages, transactions, statistics).

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::handlers::{
    categories, funds, join_requests, members, messages, statistics, transactions,
};
use crate::state::AppState;

/// Routes mounted at `/funds`.
///
/// Static segments (`lookup`, `defaults`, `subscribe-defaults`) are
/// registered alongside `{id}` captures; the router matches static paths
/// first.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(funds::list).post(funds::create))
        .route("/lookup", get(funds::lookup))
        .route(
            "/{fund_id}",
            get(funds::get).patch(funds::update).delete(funds::remove),
        )
        .route("/{fund_id}/membership", get(funds::my_membership))
        // Members.
        .route(
            "/{fund_id}/members",
            get(members::list).post(members::add),
        )
        .route(
            "/{fund_id}/members/{user_id}",
            patch(members::update_role).delete(members::remove),
        )
        // Join requests.
        .route(
            "/{fund_id}/join-requests",
            get(join_requests::list).post(join_requests::create),
        )
        .route(
            "/{fund_id}/join-requests/{request_id}/approve",
            post(join_requests::approve),
        )
        .route(
            "/{fund_id}/join-requests/{request_id}/reject",
            post(join_requests::reject),
        )
        // Categories and subscriptions.
        .route(
            "/{fund_id}/categories",
            get(categories::list_active).post(categories::create),
        )
        .route("/{fund_id}/categories/defaults", get(categories::default_tree))
        .route(
            "/{fund_id}/categories/subscribe-defaults",
            post(categories::subscribe_defaults),
        )
        .route(
            "/{fund_id}/categories/{category_id}",
            delete(categories::remove),
        )
        .route(
            "/{fund_id}/categories/{category_id}/subscribe",
            post(categories::subscribe),
        )
        .route(
            "/{fund_id}/categories/{category_id}/unsubscribe",
            post(categories::unsubscribe),
        )
        .route(
            "/{fund_id}/categories/{category_id}/subscribe-children",
            post(categories::subscribe_children),
        )
        // Messages.
        .route(
            "/{fund_id}/messages",
            get(messages::list).post(messages::create),
        )
        // Transactions and statistics.
        .route("/{fund_id}/transactions", get(transactions::list))
        .route("/{fund_id}/statistics", get(statistics::summary))
}
