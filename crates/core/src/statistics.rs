//! Fund statistics arithmetic.

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};
use serde::Serialize;

/// Spend/earn totals for a fund over a date window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundSummary {
    pub fund_id: DbId,
    pub total_spend: f64,
    pub total_earn: f64,
    pub net: f64,
}

/// Build a summary from raw totals; `net` is earn minus spend.
pub fn summarize(fund_id: DbId, total_spend: f64, total_earn: f64) -> FundSummary {
    FundSummary {
        fund_id,
        total_spend,
        total_earn,
        net: total_earn - total_spend,
    }
}

/// Validate an optional [from, to] window: when both bounds are present,
/// `from` must not be after `to`.
pub fn validate_date_window(
    from: Option<Timestamp>,
    to: Option<Timestamp>,
) -> Result<(), CoreError> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(CoreError::Validation(
                "Statistics window 'from' must not be after 'to'".to_string(),
            ));
        }
    }
    Ok(())
}
