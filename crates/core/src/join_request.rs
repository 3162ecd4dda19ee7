//! Join-request states and transition rules.
//!
//! A join request moves from pending to exactly one of approved or rejected;
//! both are terminal. Repeat requests while one is pending are answered with
//! the existing record.

use crate::error::CoreError;
use serde::Serialize;

/// Lifecycle state of a fund join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinRequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// All valid join-request status strings.
pub const VALID_JOIN_REQUEST_STATUSES: &[&str] = &["pending", "approved", "rejected"];

impl JoinRequestStatus {
    /// Return the status as a lowercase string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a status from a string slice.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(CoreError::Validation(format!(
                "Invalid join request status '{s}'. Must be one of: {}",
                VALID_JOIN_REQUEST_STATUSES.join(", ")
            ))),
        }
    }

    /// Whether a review decision may still be applied.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Validate that a request in `status` can still be approved or rejected.
pub fn ensure_reviewable(status: JoinRequestStatus) -> Result<(), CoreError> {
    if status.is_pending() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Join request was already {}",
            status.as_str()
        )))
    }
}
