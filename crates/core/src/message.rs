//! Message statuses, input limits, and the classifier extraction contract.
//!
//! A message is free text posted into a fund. The classifier turns it into
//! an [`Extraction`]; a message whose text yields no amount is terminal
//! FAILED and produces no transaction.

use crate::error::CoreError;
use crate::types::DbId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a message's free text, in characters.
pub const MAX_MESSAGE_LEN: usize = 500;

/// Failure reason recorded when the classifier returns no amount.
pub const FAILURE_NO_AMOUNT: &str = "No spend or earn amount could be extracted";

// ---------------------------------------------------------------------------
// Message status
// ---------------------------------------------------------------------------

/// Processing state of an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Pending,
    Processed,
    Failed,
}

/// All valid message status strings.
pub const VALID_MESSAGE_STATUSES: &[&str] = &["pending", "processed", "failed"];

impl MessageStatus {
    /// Return the status as a lowercase string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processed => "processed",
            Self::Failed => "failed",
        }
    }

    /// Parse a status from a string slice.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "processed" => Ok(Self::Processed),
            "failed" => Ok(Self::Failed),
            _ => Err(CoreError::Validation(format!(
                "Invalid message status '{s}'. Must be one of: {}",
                VALID_MESSAGE_STATUSES.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate message text: non-empty after trimming, at most
/// [`MAX_MESSAGE_LEN`] characters.
pub fn validate_message_text(text: &str) -> Result<(), CoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Message text must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_MESSAGE_LEN {
        return Err(CoreError::Validation(format!(
            "Message text exceeds {MAX_MESSAGE_LEN} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Extraction contract
// ---------------------------------------------------------------------------

/// Structured transaction data extracted from a message's free text.
///
/// At most one of `spend_value` / `earn_value` is non-null; a result with
/// neither carries no usable amount and must not materialize a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub spend_value: Option<f64>,
    pub earn_value: Option<f64>,
    pub content: String,
    pub category_id: Option<DbId>,
    pub metadata: Option<serde_json::Value>,
}

impl Extraction {
    /// Whether the extraction carries an amount and may become a
    /// transaction.
    pub fn has_amount(&self) -> bool {
        self.spend_value.is_some() || self.earn_value.is_some()
    }
}

/// Validate an extraction before it is persisted.
///
/// Rejects results claiming both directions at once, non-finite or negative
/// amounts, and an empty content summary.
pub fn validate_extraction(extraction: &Extraction) -> Result<(), CoreError> {
    if extraction.spend_value.is_some() && extraction.earn_value.is_some() {
        return Err(CoreError::Validation(
            "Extraction must not carry both a spend and an earn amount".to_string(),
        ));
    }

    for amount in [extraction.spend_value, extraction.earn_value].into_iter().flatten() {
        if !amount.is_finite() {
            return Err(CoreError::Validation(
                "Extraction amount must be a finite number".to_string(),
            ));
        }
        if amount < 0.0 {
            return Err(CoreError::Validation(format!(
                "Extraction amount must not be negative, got {amount}"
            )));
        }
    }

    if extraction.content.trim().is_empty() {
        return Err(CoreError::Validation(
            "Extraction content must not be empty".to_string(),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
