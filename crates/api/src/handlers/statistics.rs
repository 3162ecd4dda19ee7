//! Handlers for fund statistics.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use fundmate_core::statistics::{summarize, validate_date_window, FundSummary};
use fundmate_core::types::{DbId, Timestamp};
use fundmate_db::repositories::TransactionRepo;

use crate::error::AppResult;
use crate::membership::{assert_membership, require_fund};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /funds/{id}/statistics`. Both bounds are
/// optional and inclusive; RFC 3339 timestamps.
#[derive(Debug, Deserialize)]
pub struct StatisticsQuery {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

/// GET /api/funds/{id}/statistics
///
/// Spend/earn totals and net balance over an optional window, computed from
/// processed transactions only. Members only.
pub async fn summary(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(fund_id): Path<DbId>,
    Query(query): Query<StatisticsQuery>,
) -> AppResult<Json<DataResponse<FundSummary>>> {
    require_fund(&state.pool, fund_id).await?;
    assert_membership(&state.pool, fund_id, auth.user_id).await?;
    validate_date_window(query.from, query.to)?;

    let (total_spend, total_earn) =
        TransactionRepo::sum_for_fund(&state.pool, fund_id, query.from, query.to).await?;

    Ok(Json(DataResponse {
        data: summarize(fund_id, total_spend, total_earn),
    }))
}
