//! Append-only `program_video_metrics` snapshots.

use campsync_core::{MetricTotals, SourceType};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MetricsSnapshotRow {
    pub id: i64,
    pub source_type: String,
    pub source_id: Uuid,
    pub brand_id: Option<Uuid>,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_comments: i64,
    pub total_shares: i64,
    pub total_bookmarks: i64,
    pub total_videos: i64,
    pub recorded_at: DateTime<Utc>,
}

/// Appends a snapshot stamped with the current time. Never updates.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_metrics_snapshot(
    pool: &PgPool,
    source_type: SourceType,
    source_id: Uuid,
    brand_id: Option<Uuid>,
    totals: &MetricTotals,
) -> Result<MetricsSnapshotRow, DbError> {
    let row = sqlx::query_as::<_, MetricsSnapshotRow>(
        "INSERT INTO program_video_metrics \
             (source_type, source_id, brand_id, total_views, total_likes, total_comments, \
              total_shares, total_bookmarks, total_videos, recorded_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW()) \
         RETURNING id, source_type, source_id, brand_id, total_views, total_likes, \
                   total_comments, total_shares, total_bookmarks, total_videos, recorded_at",
    )
    .bind(source_type.as_str())
    .bind(source_id)
    .bind(brand_id)
    .bind(totals.views)
    .bind(totals.likes)
    .bind(totals.comments)
    .bind(totals.shares)
    .bind(totals.bookmarks)
    .bind(totals.videos)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns the most recent `limit` snapshots for a source, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_metrics_snapshots(
    pool: &PgPool,
    source_type: SourceType,
    source_id: Uuid,
    limit: i64,
) -> Result<Vec<MetricsSnapshotRow>, DbError> {
    let rows = sqlx::query_as::<_, MetricsSnapshotRow>(
        "SELECT id, source_type, source_id, brand_id, total_views, total_likes, \
                total_comments, total_shares, total_bookmarks, total_videos, recorded_at \
         FROM program_video_metrics \
         WHERE source_type = $1 AND source_id = $2 \
         ORDER BY recorded_at DESC, id DESC \
         LIMIT $3",
    )
    .bind(source_type.as_str())
    .bind(source_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
