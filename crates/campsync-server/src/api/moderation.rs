use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Extension, Json,
};
use campsync_core::days_remaining;
use campsync_db::PayoutItemRow;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;
use crate::moderation::{self as gate, ClawbackInput, ModerationError};

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct FlaggedQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct FlaggedItem {
    payout_item_id: Uuid,
    payout_request_id: Uuid,
    submission_id: Uuid,
    creator_id: Uuid,
    amount: Decimal,
    flagged_at: DateTime<Utc>,
    flagged_by: Option<Uuid>,
    flag_reason: Option<String>,
    clawback_status: Option<String>,
    platform: String,
    video_url: String,
    video_title: Option<String>,
    clearing_ends_at: DateTime<Utc>,
    days_remaining: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct PayoutItemData {
    payout_item_id: Uuid,
    submission_id: Uuid,
    creator_id: Uuid,
    amount: Decimal,
    flagged_at: Option<DateTime<Utc>>,
    flag_reason: Option<String>,
    clawback_status: Option<String>,
    clawback_reason: Option<String>,
    clawed_back_at: Option<DateTime<Utc>>,
}

impl From<PayoutItemRow> for PayoutItemData {
    fn from(row: PayoutItemRow) -> Self {
        Self {
            payout_item_id: row.id,
            submission_id: row.submission_id,
            creator_id: row.creator_id,
            amount: row.amount,
            flagged_at: row.flagged_at,
            flag_reason: row.flag_reason,
            clawback_status: row.clawback_status,
            clawback_reason: row.clawback_reason,
            clawed_back_at: row.clawed_back_at,
        }
    }
}

/// Body shared by the moderation actions. Every field is optional; `confirm`
/// only matters for clawback.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ModerationBody {
    pub reason: Option<String>,
    pub reviewer_id: Option<Uuid>,
    pub confirm: bool,
}

fn parse_body(req_id: &str, body: &[u8]) -> Result<ModerationBody, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ModerationBody::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        ApiError::new(
            req_id,
            "validation_error",
            format!("invalid request body: {e}"),
        )
    })
}

fn map_moderation_error(request_id: String, error: ModerationError) -> ApiError {
    match error {
        ModerationError::NotFound => ApiError::new(request_id, "not_found", "payout item not found"),
        ModerationError::Conflict(message) => ApiError::new(request_id, "conflict", message),
        ModerationError::ConfirmationRequired => ApiError::new(
            request_id,
            "validation_error",
            "clawback requires \"confirm\": true",
        ),
        ModerationError::FunctionsUnavailable => ApiError::new(
            request_id,
            "service_unavailable",
            "settlement functions are not configured",
        ),
        ModerationError::Upstream(e) => {
            tracing::error!(error = %e, "settlement function failed");
            ApiError::new(request_id, "upstream_error", e.to_string())
        }
        ModerationError::Db(e) => map_db_error(request_id, &e),
    }
}

/// `GET /api/v1/moderation/flagged`: items awaiting a decision.
pub(super) async fn list_flagged_items(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<FlaggedQuery>,
) -> Result<Json<ApiResponse<Vec<FlaggedItem>>>, ApiError> {
    let rows = campsync_db::list_pending_flagged_items(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let now = Utc::now();
    let data = rows
        .into_iter()
        .map(|row| FlaggedItem {
            payout_item_id: row.id,
            payout_request_id: row.payout_request_id,
            submission_id: row.submission_id,
            creator_id: row.creator_id,
            amount: row.amount,
            flagged_at: row.flagged_at,
            flagged_by: row.flagged_by,
            flag_reason: row.flag_reason,
            clawback_status: row.clawback_status,
            platform: row.platform,
            video_url: row.video_url,
            video_title: row.video_title,
            days_remaining: days_remaining(row.clearing_ends_at, now),
            clearing_ends_at: row.clearing_ends_at,
        })
        .collect();

    Ok(Json(ApiResponse::new(req_id.0, data)))
}

pub(super) async fn flag_item(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(item_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<ApiResponse<PayoutItemData>>, ApiError> {
    let body = parse_body(&req_id.0, &body)?;
    let item = gate::flag_item(&state.pool, item_id, body.reviewer_id, body.reason.as_deref())
        .await
        .map_err(|e| map_moderation_error(req_id.0.clone(), e))?;
    Ok(Json(ApiResponse::new(req_id.0, item.into())))
}

pub(super) async fn clear_item(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(item_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<ApiResponse<PayoutItemData>>, ApiError> {
    let body = parse_body(&req_id.0, &body)?;
    let item = gate::clear_item(
        &state.pool,
        state.functions.as_deref(),
        item_id,
        body.reviewer_id,
    )
    .await
    .map_err(|e| map_moderation_error(req_id.0.clone(), e))?;
    Ok(Json(ApiResponse::new(req_id.0, item.into())))
}

pub(super) async fn claw_back_item(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(item_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<ApiResponse<PayoutItemData>>, ApiError> {
    let body = parse_body(&req_id.0, &body)?;
    let item = gate::claw_back_item(
        &state.pool,
        state.functions.as_deref(),
        item_id,
        ClawbackInput {
            confirm: body.confirm,
            reason: body.reason.as_deref(),
            reviewer: body.reviewer_id,
        },
    )
    .await
    .map_err(|e| map_moderation_error(req_id.0.clone(), e))?;
    Ok(Json(ApiResponse::new(req_id.0, item.into())))
}
