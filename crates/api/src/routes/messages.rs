//! Route definitions for fund-independent message operations.

use axum::routing::get;
use axum::Router;

use crate::handlers::messages;
use crate::state::AppState;

/// Routes mounted at `/messages`.
///
/// ```text
/// GET    /{id} -> fetch a message
/// PATCH  /{id} -> edit text and re-classify (author only)
/// DELETE /{id} -> delete, cascading to the transaction (author only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{message_id}",
        get(messages::get)
            .patch(messages::update)
            .delete(messages::remove),
    )
}
