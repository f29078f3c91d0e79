use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct SyncRunsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct SyncRunItem {
    sync_run_id: Uuid,
    trigger_source: String,
    status: String,
    brand_id: Option<Uuid>,
    campaign_id: Option<Uuid>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    brands_processed: i32,
    videos_matched: i32,
    videos_unmatched: i32,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<campsync_db::SyncRunRow> for SyncRunItem {
    fn from(row: campsync_db::SyncRunRow) -> Self {
        Self {
            sync_run_id: row.public_id,
            trigger_source: row.trigger_source,
            status: row.status,
            brand_id: row.brand_id,
            campaign_id: row.campaign_id,
            started_at: row.started_at,
            completed_at: row.completed_at,
            brands_processed: row.brands_processed,
            videos_matched: row.videos_matched,
            videos_unmatched: row.videos_unmatched,
            error_message: row.error_message,
            created_at: row.created_at,
        }
    }
}

pub(super) async fn list_sync_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SyncRunsQuery>,
) -> Result<Json<ApiResponse<Vec<SyncRunItem>>>, ApiError> {
    let rows = campsync_db::list_sync_runs(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(SyncRunItem::from).collect();
    Ok(Json(ApiResponse::new(req_id.0, data)))
}
