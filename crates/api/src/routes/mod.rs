//! Route definitions, one module per top-level resource.

pub mod auth;
pub mod categories;
pub mod funds;
pub mod health;
pub mod messages;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         current user profile
///
/// /funds                                           list, create
/// /funds/lookup?share_code=NNNNNN                  public info by share code
/// /funds/{id}                                      get, update, delete
/// /funds/{id}/membership                           caller's membership status
///
/// /funds/{id}/members                              list, add
/// /funds/{id}/members/{user_id}                    change role, remove
///
/// /funds/{id}/join-requests                        create, list
/// /funds/{id}/join-requests/{rid}/approve          approve (POST)
/// /funds/{id}/join-requests/{rid}/reject           reject (POST)
///
/// /funds/{id}/categories                           active leaves, create custom
/// /funds/{id}/categories/defaults                  default tree w/ subscription flags
/// /funds/{id}/categories/subscribe-defaults        subscribe all default leaves (POST)
/// /funds/{id}/categories/{cid}                     remove (DELETE)
/// /funds/{id}/categories/{cid}/subscribe           subscribe leaf (POST)
/// /funds/{id}/categories/{cid}/unsubscribe         unsubscribe (POST)
/// /funds/{id}/categories/{cid}/subscribe-children  subscribe root's children (POST)
/// /categories/{id}                                 edit custom category (PATCH)
///
/// /funds/{id}/messages                             list, post
/// /messages/{id}                                   get, edit (re-classify), delete
///
/// /funds/{id}/transactions                         list
/// /funds/{id}/statistics                           spend/earn summary
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/funds", funds::router())
        .nest("/categories", categories::router())
        .nest("/messages", messages::router())
}
