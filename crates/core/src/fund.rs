//! Fund constants, validation, and the share-code allocation strategy.
//!
//! A fund is a shared wallet. Discoverability is deliberately limited to an
//! exact-match lookup by a 6-digit share code, so the code space and the
//! allocation strategy live here where both the API and tests can reach
//! them.

use rand::Rng;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of a fund share code, in decimal digits.
pub const SHARE_CODE_LEN: usize = 6;

/// Size of the share-code space (codes are 000000..=999999).
pub const SHARE_CODE_SPACE: u32 = 1_000_000;

/// How many candidate codes to try before giving up.
pub const SHARE_CODE_MAX_ATTEMPTS: u32 = 10;

/// Maximum length of a fund name.
pub const MAX_FUND_NAME_LEN: usize = 100;

/// Maximum length of a fund description.
pub const MAX_FUND_DESCRIPTION_LEN: usize = 500;

// ---------------------------------------------------------------------------
// Fund type
// ---------------------------------------------------------------------------

/// Whether a fund is a single-user wallet or shared between users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FundType {
    Personal,
    Shared,
}

/// All valid fund type strings.
pub const VALID_FUND_TYPES: &[&str] = &["personal", "shared"];

impl FundType {
    /// Return the fund type as a lowercase string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Shared => "shared",
        }
    }

    /// Parse a fund type from a string slice.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "personal" => Ok(Self::Personal),
            "shared" => Ok(Self::Shared),
            _ => Err(CoreError::Validation(format!(
                "Invalid fund type '{s}'. Must be one of: {}",
                VALID_FUND_TYPES.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Share codes
// ---------------------------------------------------------------------------

/// Source of candidate share codes.
///
/// Production draws uniformly at random; tests substitute a scripted
/// sequence so collision and exhaustion paths are reproducible. Uniqueness
/// is NOT this trait's job: callers check the store and retry, and the
/// database unique constraint is the final backstop.
pub trait ShareCodeSource: Send {
    /// Produce the next candidate code (always [`SHARE_CODE_LEN`] digits).
    fn allocate(&mut self) -> String;
}

/// Uniform random draw over the full code space.
pub struct RandomShareCodes;

impl ShareCodeSource for RandomShareCodes {
    fn allocate(&mut self) -> String {
        format_share_code(rand::rng().random_range(0..SHARE_CODE_SPACE))
    }
}

/// Deterministic sequence of codes, repeating the last one when exhausted.
pub struct ScriptedShareCodes {
    codes: Vec<String>,
    next: usize,
}

impl ScriptedShareCodes {
    pub fn new<S: Into<String>>(codes: impl IntoIterator<Item = S>) -> Self {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
            next: 0,
        }
    }
}

impl ShareCodeSource for ScriptedShareCodes {
    fn allocate(&mut self) -> String {
        let idx = self.next.min(self.codes.len().saturating_sub(1));
        self.next += 1;
        self.codes.get(idx).cloned().unwrap_or_else(|| "000000".to_string())
    }
}

/// Zero-pad a numeric code to [`SHARE_CODE_LEN`] digits.
pub fn format_share_code(n: u32) -> String {
    format!("{n:06}")
}

/// Validate that a share code is exactly [`SHARE_CODE_LEN`] ASCII digits.
pub fn validate_share_code(code: &str) -> Result<(), CoreError> {
    if code.len() != SHARE_CODE_LEN || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::Validation(format!(
            "Invalid share code '{code}'. Must be exactly {SHARE_CODE_LEN} digits"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate a fund name: non-empty after trimming, at most
/// [`MAX_FUND_NAME_LEN`] characters.
pub fn validate_fund_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Fund name must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_FUND_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Fund name exceeds {MAX_FUND_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate an optional fund description against
/// [`MAX_FUND_DESCRIPTION_LEN`].
pub fn validate_fund_description(description: Option<&str>) -> Result<(), CoreError> {
    if let Some(d) = description {
        if d.chars().count() > MAX_FUND_DESCRIPTION_LEN {
            return Err(CoreError::Validation(format!(
                "Fund description exceeds {MAX_FUND_DESCRIPTION_LEN} characters"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Activity ordering
// ---------------------------------------------------------------------------

/// Compute a fund's effective last-activity time.
///
/// Falls back to `updated_at` for funds that have no messages yet. Fund
/// listings recompute this per row and sort in memory rather than trusting
/// the denormalized pointer alone.
pub fn last_activity_at(last_message_at: Option<Timestamp>, updated_at: Timestamp) -> Timestamp {
    match last_message_at {
        Some(t) if t > updated_at => t,
        _ => updated_at,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
