//! Database operations for `video_submissions`.

use campsync_core::{CollectedVideo, LinkedAccount, SourceType, SubmissionStatus, VideoMetrics};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A matched video to materialize as a campaign submission.
#[derive(Debug, Clone, Copy)]
pub struct TrackedSubmission<'a> {
    pub campaign_id: Uuid,
    pub brand_id: Uuid,
    pub video: &'a CollectedVideo,
    pub account: &'a LinkedAccount,
}

/// Metrics of one approved submission.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct SubmissionMetricsRow {
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub bookmarks: i64,
}

impl From<SubmissionMetricsRow> for VideoMetrics {
    fn from(row: SubmissionMetricsRow) -> Self {
        Self {
            views: row.views,
            likes: row.likes,
            comments: row.comments,
            shares: row.shares,
            bookmarks: row.bookmarks,
        }
    }
}

/// Creates or refreshes the tracked submission for a matched video.
///
/// A new row starts as `pending`. On conflict with
/// `(shortimize_video_id, source_id)` the content, metrics, account, and
/// `metrics_updated_at` are refreshed; `status` is never touched, so a
/// reviewer's decision survives every re-sync. Returns the row id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_tracked_submission(
    pool: &PgPool,
    submission: &TrackedSubmission<'_>,
) -> Result<Uuid, DbError> {
    let video = submission.video;
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO video_submissions \
             (source_type, source_id, brand_id, creator_id, social_account_id, source, status, \
              shortimize_video_id, platform, video_url, video_title, video_description, \
              video_thumbnail_url, video_author_username, video_upload_date, \
              views, likes, comments, shares, bookmarks, submitted_at, metrics_updated_at) \
         VALUES ($1, $2, $3, $4, $5, 'tracked', $6, $7, $8, $9, $10, $11, $12, $13, $14, \
                 $15, $16, $17, $18, $19, COALESCE($14, NOW()), NOW()) \
         ON CONFLICT (shortimize_video_id, source_id) DO UPDATE SET \
             creator_id            = EXCLUDED.creator_id, \
             social_account_id     = EXCLUDED.social_account_id, \
             platform              = EXCLUDED.platform, \
             video_url             = EXCLUDED.video_url, \
             video_title           = EXCLUDED.video_title, \
             video_description     = EXCLUDED.video_description, \
             video_thumbnail_url   = EXCLUDED.video_thumbnail_url, \
             video_author_username = EXCLUDED.video_author_username, \
             video_upload_date     = EXCLUDED.video_upload_date, \
             views                 = EXCLUDED.views, \
             likes                 = EXCLUDED.likes, \
             comments              = EXCLUDED.comments, \
             shares                = EXCLUDED.shares, \
             bookmarks             = EXCLUDED.bookmarks, \
             metrics_updated_at    = NOW(), \
             updated_at            = NOW() \
         RETURNING id",
    )
    .bind(SourceType::Campaign.as_str())
    .bind(submission.campaign_id)
    .bind(submission.brand_id)
    .bind(submission.account.user_id)
    .bind(submission.account.id)
    .bind(SubmissionStatus::Pending.as_str())
    .bind(&video.external_id)
    .bind(&video.platform)
    .bind(video.video_url.as_deref().unwrap_or_default())
    .bind(video.title.as_deref())
    .bind(video.submission_description())
    .bind(video.thumbnail_url.as_deref())
    .bind(&video.username)
    .bind(video.uploaded_at)
    .bind(video.metrics.views)
    .bind(video.metrics.likes)
    .bind(video.metrics.comments)
    .bind(video.metrics.shares)
    .bind(video.metrics.bookmarks)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns the metrics of every approved submission for a source.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_approved_submission_metrics(
    pool: &PgPool,
    source_type: SourceType,
    source_id: Uuid,
) -> Result<Vec<SubmissionMetricsRow>, DbError> {
    let rows = sqlx::query_as::<_, SubmissionMetricsRow>(
        "SELECT views, likes, comments, shares, bookmarks \
         FROM video_submissions \
         WHERE source_type = $1 AND source_id = $2 AND status = $3",
    )
    .bind(source_type.as_str())
    .bind(source_id)
    .bind(SubmissionStatus::Approved.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
