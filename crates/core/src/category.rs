//! Category taxonomy rules.
//!
//! Categories form a fixed two-level tree: roots (no parent) group leaves
//! (parent set). System defaults have no fund; custom categories belong to
//! one fund. Only leaves may be subscribed by a fund or used on
//! transactions, so validation here is a handful of parent/leaf checks
//! rather than any tree traversal.

use std::cmp::Ordering;

use crate::error::CoreError;
use crate::types::DbId;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a category name.
pub const MAX_CATEGORY_NAME_LEN: usize = 100;

/// Maximum length of a category description.
pub const MAX_CATEGORY_DESCRIPTION_LEN: usize = 500;

// ---------------------------------------------------------------------------
// Leaf / root checks
// ---------------------------------------------------------------------------

/// A category with a parent is a leaf; roots are organizational only.
pub fn is_leaf(parent_id: Option<DbId>) -> bool {
    parent_id.is_some()
}

/// Validate that a category may be subscribed or used on a transaction.
pub fn ensure_subscribable(parent_id: Option<DbId>) -> Result<(), CoreError> {
    if is_leaf(parent_id) {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "Only child categories can be subscribed; root categories are organizational only"
                .to_string(),
        ))
    }
}

/// Validate that a category may be edited or deleted directly.
///
/// System defaults are shared across funds and immutable; funds detach from
/// them by deactivating their subscription instead.
pub fn ensure_editable(is_default: bool) -> Result<(), CoreError> {
    if is_default {
        Err(CoreError::Validation(
            "Default categories cannot be modified".to_string(),
        ))
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Custom-category creation policy
// ---------------------------------------------------------------------------

/// The fields of a prospective parent that the creation policy inspects.
#[derive(Debug, Clone, Copy)]
pub struct ParentCheck {
    pub fund_id: Option<DbId>,
    pub parent_id: Option<DbId>,
    pub is_default: bool,
}

/// Validate the parent chosen for a new custom category.
///
/// Custom trees are fund-private: the parent must be a custom root owned by
/// the same fund. Attaching a custom leaf under a default root (or under
/// another fund's root) is rejected.
pub fn ensure_custom_parent(fund_id: DbId, parent: ParentCheck) -> Result<(), CoreError> {
    if parent.is_default {
        return Err(CoreError::Validation(
            "Parent must be a custom category, not a system default".to_string(),
        ));
    }
    if parent.parent_id.is_some() {
        return Err(CoreError::Validation(
            "Parent must be a root category; the taxonomy is two levels deep".to_string(),
        ));
    }
    if parent.fund_id != Some(fund_id) {
        return Err(CoreError::Validation(
            "Parent category must belong to the same fund".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Classifier prompt ordering
// ---------------------------------------------------------------------------

/// A subscribed leaf category as offered to the classifier.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryOption {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_default: bool,
}

/// Order categories for the classifier prompt: fund-custom entries before
/// system defaults, then alphabetically, so user intent outranks the stock
/// taxonomy.
pub fn sort_for_prompt(options: &mut [CategoryOption]) {
    options.sort_by(|a, b| match (a.is_default, b.is_default) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate a category name: non-empty after trimming, at most
/// [`MAX_CATEGORY_NAME_LEN`] characters.
pub fn validate_category_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Category name must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_CATEGORY_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Category name exceeds {MAX_CATEGORY_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate an optional category description.
pub fn validate_category_description(description: Option<&str>) -> Result<(), CoreError> {
    if let Some(d) = description {
        if d.chars().count() > MAX_CATEGORY_DESCRIPTION_LEN {
            return Err(CoreError::Validation(format!(
                "Category description exceeds {MAX_CATEGORY_DESCRIPTION_LEN} characters"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
