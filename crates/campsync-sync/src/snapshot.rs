//! Campaign-level metrics snapshots over approved submissions.

use campsync_core::{MetricTotals, SourceType, VideoMetrics};
use campsync_db::{DbError, MetricsSnapshotRow};
use sqlx::PgPool;
use uuid::Uuid;

/// Append a snapshot of the campaign's approved-submission totals.
///
/// Returns `Ok(None)` and writes nothing when the campaign has no approved
/// submissions.
///
/// # Errors
///
/// Returns [`DbError`] if reading submissions or inserting the snapshot fails.
pub async fn record_campaign_snapshot(
    pool: &PgPool,
    campaign_id: Uuid,
    brand_id: Uuid,
) -> Result<Option<MetricsSnapshotRow>, DbError> {
    let approved: Vec<VideoMetrics> =
        campsync_db::list_approved_submission_metrics(pool, SourceType::Campaign, campaign_id)
            .await?
            .into_iter()
            .map(VideoMetrics::from)
            .collect();

    let Some(totals) = MetricTotals::aggregate(&approved) else {
        tracing::debug!(%campaign_id, "no approved submissions, skipping snapshot");
        return Ok(None);
    };

    let row = campsync_db::insert_metrics_snapshot(
        pool,
        SourceType::Campaign,
        campaign_id,
        Some(brand_id),
        &totals,
    )
    .await?;

    tracing::info!(
        %campaign_id,
        videos = totals.videos,
        views = totals.views,
        "recorded campaign metrics snapshot"
    );
    Ok(Some(row))
}
