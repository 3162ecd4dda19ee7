//! Route definitions for fund-independent category operations.

use axum::routing::patch;
use axum::Router;

use crate::handlers::categories;
use crate::state::AppState;

/// Routes mounted at `/categories`.
///
/// ```text
/// PATCH /{id} -> edit a custom category (authorized against its fund)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{category_id}", patch(categories::update))
}
