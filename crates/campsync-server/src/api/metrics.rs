use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use campsync_core::SourceType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct MetricsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct MetricsSnapshotItem {
    total_views: i64,
    total_likes: i64,
    total_comments: i64,
    total_shares: i64,
    total_bookmarks: i64,
    total_videos: i64,
    recorded_at: DateTime<Utc>,
}

/// `GET /api/v1/campaigns/{id}/metrics`: snapshot history, newest first.
pub(super) async fn list_campaign_metrics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(campaign_id): Path<Uuid>,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<ApiResponse<Vec<MetricsSnapshotItem>>>, ApiError> {
    let rows = campsync_db::list_metrics_snapshots(
        &state.pool,
        SourceType::Campaign,
        campaign_id,
        normalize_limit(query.limit),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| MetricsSnapshotItem {
            total_views: row.total_views,
            total_likes: row.total_likes,
            total_comments: row.total_comments,
            total_shares: row.total_shares,
            total_bookmarks: row.total_bookmarks,
            total_videos: row.total_videos,
            recorded_at: row.recorded_at,
        })
        .collect();

    Ok(Json(ApiResponse::new(req_id.0, data)))
}
