//! Handlers for fund transactions (read-only; transactions are materialized
//! by the ingestion pipeline, never written directly over HTTP).

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use fundmate_core::pagination::{clamp_page, clamp_per_page, offset};
use fundmate_core::types::DbId;
use fundmate_db::models::transaction::Transaction;
use fundmate_db::repositories::TransactionRepo;

use crate::error::AppResult;
use crate::membership::{assert_membership, require_fund};
use crate::middleware::auth::AuthUser;
use crate::response::{PagedResponse, Pagination};
use crate::state::AppState;

/// Query parameters for `GET /funds/{id}/transactions`.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// GET /api/funds/{id}/transactions
///
/// List a fund's transactions, newest occurrence first. Members only.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(fund_id): Path<DbId>,
    Query(query): Query<ListTransactionsQuery>,
) -> AppResult<Json<PagedResponse<Transaction>>> {
    require_fund(&state.pool, fund_id).await?;
    assert_membership(&state.pool, fund_id, auth.user_id).await?;

    let page = clamp_page(query.page);
    let per_page = clamp_per_page(query.per_page);

    let total = TransactionRepo::count_by_fund(&state.pool, fund_id).await?;
    let data =
        TransactionRepo::list_by_fund(&state.pool, fund_id, per_page, offset(page, per_page))
            .await?;

    Ok(Json(PagedResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
        },
    }))
}
