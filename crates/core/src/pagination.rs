//! Pagination defaults and clamping helpers.
//!
//! Lives in `core` (zero internal deps) so repositories and handlers share
//! one set of limits.

/// Default number of rows per page.
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Maximum number of rows per page.
pub const MAX_PER_PAGE: i64 = 100;

/// Clamp a user-provided 1-based page number.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// Clamp a user-provided page size to `1..=`[`MAX_PER_PAGE`].
pub fn clamp_per_page(per_page: Option<i64>) -> i64 {
    per_page.unwrap_or(DEFAULT_PER_PAGE).max(1).min(MAX_PER_PAGE)
}

/// Row offset for a clamped (page, per_page) pair.
pub fn offset(page: i64, per_page: i64) -> i64 {
    (page - 1) * per_page
}
