//! Per-video writes: the campaign video cache and tracked submissions.

use campsync_core::{decide_baseline, BaselineDecision, CollectedVideo, LinkedAccount};
use campsync_db::{DbError, NewCachedVideo, TrackedSubmission};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

/// Write one video to the campaign cache, resetting its weekly baseline
/// only when the stored week start differs from `week_start`.
pub(crate) async fn write_cache_entry(
    pool: &PgPool,
    entry: &NewCachedVideo<'_>,
    week_start: NaiveDate,
) -> Result<(), DbError> {
    let existing =
        campsync_db::get_cached_video_baseline(pool, &entry.video.external_id, entry.campaign_id)
            .await?;

    let decision = decide_baseline(
        existing.as_ref().and_then(|row| row.week_start_date),
        week_start,
        entry.video.metrics.views,
    );

    match (existing, decision) {
        (Some(row), BaselineDecision::CarryForward) => {
            campsync_db::update_cached_video(pool, row.id, entry, None).await
        }
        (Some(row), BaselineDecision::Reset(baseline)) => {
            tracing::debug!(
                video = %entry.video.external_id,
                views = baseline.week_start_views,
                "resetting weekly baseline"
            );
            campsync_db::update_cached_video(pool, row.id, entry, Some(baseline)).await
        }
        (None, BaselineDecision::Reset(baseline)) => {
            campsync_db::insert_cached_video(pool, entry, baseline).await
        }
        (None, BaselineDecision::CarryForward) => {
            // decide_baseline never carries forward without a stored week.
            Err(DbError::NotFound)
        }
    }
}

pub(crate) async fn write_submission(
    pool: &PgPool,
    campaign_id: Uuid,
    brand_id: Uuid,
    video: &CollectedVideo,
    account: &LinkedAccount,
) -> Result<Uuid, DbError> {
    campsync_db::upsert_tracked_submission(
        pool,
        &TrackedSubmission {
            campaign_id,
            brand_id,
            video,
            account,
        },
    )
    .await
}
