//! Handlers for fund messages and their ingestion.
//!
//! Creation branches on the configured ingest mode: sync mode classifies
//! inline and returns the terminal message, queue mode enqueues a parse job
//! and returns 202 with the pending message. Edits and deletes are
//! author-only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use fundmate_core::error::CoreError;
use fundmate_core::message::validate_message_text;
use fundmate_core::pagination::{clamp_page, clamp_per_page, offset};
use fundmate_core::types::DbId;
use fundmate_db::models::message::{CreateMessage, Message};
use fundmate_db::repositories::{FundRepo, MessageRepo, ParseJobRepo};
use fundmate_ingest::retry::MAX_PARSE_ATTEMPTS;
use fundmate_ingest::{pipeline, ProcessOutcome, UpdateOutcome};

use crate::config::IngestMode;
use crate::error::{AppError, AppResult};
use crate::membership::{assert_membership, require_fund};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, PagedResponse, Pagination};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /funds/{id}/messages`.
#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub body: String,
}

/// Request body for `PATCH /messages/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateMessageRequest {
    pub body: String,
}

/// Query parameters for `GET /funds/{id}/messages`.
#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/funds/{id}/messages
///
/// List a fund's messages, newest first. Members only.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(fund_id): Path<DbId>,
    Query(query): Query<ListMessagesQuery>,
) -> AppResult<Json<PagedResponse<Message>>> {
    require_fund(&state.pool, fund_id).await?;
    assert_membership(&state.pool, fund_id, auth.user_id).await?;

    let page = clamp_page(query.page);
    let per_page = clamp_per_page(query.per_page);

    let total = MessageRepo::count_by_fund(&state.pool, fund_id).await?;
    let data =
        MessageRepo::list_by_fund(&state.pool, fund_id, per_page, offset(page, per_page)).await?;

    Ok(Json(PagedResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
        },
    }))
}

/// POST /api/funds/{id}/messages
///
/// Post a message into a fund. Sync mode classifies before responding and
/// returns 201 with the terminal message (PROCESSED or FAILED both count as
/// accepted); queue mode stores the pending message, enqueues a parse job,
/// and returns 202.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(fund_id): Path<DbId>,
    Json(input): Json<CreateMessageRequest>,
) -> AppResult<impl IntoResponse> {
    require_fund(&state.pool, fund_id).await?;
    assert_membership(&state.pool, fund_id, auth.user_id).await?;
    validate_message_text(&input.body)?;

    let message = MessageRepo::create(
        &state.pool,
        &CreateMessage {
            fund_id,
            user_id: auth.user_id,
            body: input.body.trim().to_string(),
        },
    )
    .await?;

    // The fund's activity pointer advances on posting, not on processing.
    FundRepo::refresh_last_message(&state.pool, fund_id).await?;

    match state.config.ingest.mode {
        IngestMode::Sync => {
            let outcome =
                pipeline::process_message_sync(&state.pool, state.classifier.as_ref(), message.id)
                    .await?;
            let message = match outcome {
                ProcessOutcome::Processed(m) | ProcessOutcome::Failed(m) => m,
            };
            Ok((StatusCode::CREATED, Json(DataResponse { data: message })))
        }
        IngestMode::Queue => {
            ParseJobRepo::enqueue(&state.pool, message.id, MAX_PARSE_ATTEMPTS).await?;
            tracing::debug!(message_id = message.id, "Parse job enqueued");
            Ok((StatusCode::ACCEPTED, Json(DataResponse { data: message })))
        }
    }
}

/// GET /api/messages/{id}
///
/// Fetch a single message. Members of its fund only.
pub async fn get(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(message_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Message>>> {
    let message = find_message(&state, message_id).await?;
    assert_membership(&state.pool, message.fund_id, auth.user_id).await?;
    Ok(Json(DataResponse { data: message }))
}

/// PATCH /api/messages/{id}
///
/// Edit a message's text and re-classify it. Author only. An edit whose new
/// text yields no usable data leaves the stored message untouched.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(message_id): Path<DbId>,
    Json(input): Json<UpdateMessageRequest>,
) -> AppResult<Json<DataResponse<Message>>> {
    let message = find_message(&state, message_id).await?;
    ensure_author(&message, auth.user_id)?;
    validate_message_text(&input.body)?;

    let outcome = pipeline::reclassify_message(
        &state.pool,
        state.classifier.as_ref(),
        message.id,
        input.body.trim(),
    )
    .await?;

    let message = match outcome {
        UpdateOutcome::Applied(m) | UpdateOutcome::Ignored(m) => m,
    };
    Ok(Json(DataResponse { data: message }))
}

/// DELETE /api/messages/{id}
///
/// Delete a message, cascading to its linked transaction and pulling the
/// fund's activity pointer back. Author only.
pub async fn remove(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(message_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let message = find_message(&state, message_id).await?;
    ensure_author(&message, auth.user_id)?;

    pipeline::delete_message(&state.pool, message.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_message(state: &AppState, message_id: DbId) -> AppResult<Message> {
    MessageRepo::find_by_id(&state.pool, message_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Message",
            id: message_id,
        }))
}

fn ensure_author(message: &Message, user_id: DbId) -> AppResult<()> {
    if message.user_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the author can modify this message".into(),
        )));
    }
    Ok(())
}
