//! Database operations for `cached_campaign_videos`.
//!
//! Writes are split into an explicit read, then either an update by row id
//! or an insert. The insert still carries `ON CONFLICT DO UPDATE` on
//! `(shortimize_video_id, campaign_id)` so a concurrent insert of the same
//! video degrades into a refresh instead of an error.

use campsync_core::{CollectedVideo, LinkedAccount, WeekBaseline};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// The stored baseline of an existing cache entry.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CachedVideoBaselineRow {
    pub id: Uuid,
    pub week_start_date: Option<NaiveDate>,
    pub week_start_views: Option<i64>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CachedVideoRow {
    pub id: Uuid,
    pub brand_id: Uuid,
    pub campaign_id: Uuid,
    pub shortimize_video_id: String,
    pub platform: String,
    pub username: String,
    pub video_url: Option<String>,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub bookmarks: i64,
    pub user_id: Option<Uuid>,
    pub social_account_id: Option<Uuid>,
    pub matched_at: Option<DateTime<Utc>>,
    pub week_start_date: Option<NaiveDate>,
    pub week_start_views: Option<i64>,
    pub cached_at: DateTime<Utc>,
}

/// Content of one cache write.
#[derive(Debug, Clone, Copy)]
pub struct NewCachedVideo<'a> {
    pub brand_id: Uuid,
    pub campaign_id: Uuid,
    pub video: &'a CollectedVideo,
    /// The matched account, if any. Unmatched videos are cached too.
    pub account: Option<&'a LinkedAccount>,
}

impl NewCachedVideo<'_> {
    fn user_id(&self) -> Option<Uuid> {
        self.account.map(|a| a.user_id)
    }

    fn social_account_id(&self) -> Option<Uuid> {
        self.account.map(|a| a.id)
    }
}

/// Reads the baseline of the entry for `(video_id, campaign_id)`, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_cached_video_baseline(
    pool: &PgPool,
    shortimize_video_id: &str,
    campaign_id: Uuid,
) -> Result<Option<CachedVideoBaselineRow>, DbError> {
    let row = sqlx::query_as::<_, CachedVideoBaselineRow>(
        "SELECT id, week_start_date, week_start_views \
         FROM cached_campaign_videos \
         WHERE shortimize_video_id = $1 AND campaign_id = $2",
    )
    .bind(shortimize_video_id)
    .bind(campaign_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a new cache entry with a fresh weekly baseline.
///
/// On a unique-key conflict the existing row's content and metrics are
/// refreshed and its baseline is left alone.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_cached_video(
    pool: &PgPool,
    entry: &NewCachedVideo<'_>,
    baseline: WeekBaseline,
) -> Result<(), DbError> {
    let video = entry.video;
    sqlx::query(
        "INSERT INTO cached_campaign_videos \
             (brand_id, campaign_id, shortimize_video_id, platform, username, video_url, \
              thumbnail_url, title, caption, description, views, likes, comments, shares, \
              bookmarks, uploaded_at, user_id, social_account_id, matched_at, \
              week_start_date, week_start_views, cached_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                 $17, $18, CASE WHEN $18::uuid IS NULL THEN NULL ELSE NOW() END, \
                 $19, $20, NOW()) \
         ON CONFLICT (shortimize_video_id, campaign_id) DO UPDATE SET \
             platform          = EXCLUDED.platform, \
             username          = EXCLUDED.username, \
             video_url         = EXCLUDED.video_url, \
             thumbnail_url     = EXCLUDED.thumbnail_url, \
             title             = EXCLUDED.title, \
             caption           = EXCLUDED.caption, \
             description       = EXCLUDED.description, \
             views             = EXCLUDED.views, \
             likes             = EXCLUDED.likes, \
             comments          = EXCLUDED.comments, \
             shares            = EXCLUDED.shares, \
             bookmarks         = EXCLUDED.bookmarks, \
             uploaded_at       = EXCLUDED.uploaded_at, \
             user_id           = EXCLUDED.user_id, \
             social_account_id = EXCLUDED.social_account_id, \
             matched_at        = EXCLUDED.matched_at, \
             cached_at         = NOW(), \
             updated_at        = NOW()",
    )
    .bind(entry.brand_id)
    .bind(entry.campaign_id)
    .bind(&video.external_id)
    .bind(&video.platform)
    .bind(&video.username)
    .bind(video.video_url.as_deref())
    .bind(video.thumbnail_url.as_deref())
    .bind(video.title.as_deref())
    .bind(video.caption.as_deref())
    .bind(video.description.as_deref())
    .bind(video.metrics.views)
    .bind(video.metrics.likes)
    .bind(video.metrics.comments)
    .bind(video.metrics.shares)
    .bind(video.metrics.bookmarks)
    .bind(video.uploaded_at)
    .bind(entry.user_id())
    .bind(entry.social_account_id())
    .bind(baseline.week_start_date)
    .bind(baseline.week_start_views)
    .execute(pool)
    .await?;

    Ok(())
}

/// Refreshes an existing cache entry by row id.
///
/// The baseline columns are overwritten only when `baseline` is `Some`;
/// otherwise the stored values carry forward.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the row no longer exists, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_cached_video(
    pool: &PgPool,
    id: Uuid,
    entry: &NewCachedVideo<'_>,
    baseline: Option<WeekBaseline>,
) -> Result<(), DbError> {
    let video = entry.video;
    let result = sqlx::query(
        "UPDATE cached_campaign_videos SET \
             platform          = $2, \
             username          = $3, \
             video_url         = $4, \
             thumbnail_url     = $5, \
             title             = $6, \
             caption           = $7, \
             description       = $8, \
             views             = $9, \
             likes             = $10, \
             comments          = $11, \
             shares            = $12, \
             bookmarks         = $13, \
             uploaded_at       = $14, \
             user_id           = $15, \
             social_account_id = $16, \
             matched_at        = CASE WHEN $16::uuid IS NULL THEN NULL \
                                      ELSE COALESCE(matched_at, NOW()) END, \
             week_start_date   = COALESCE($17, week_start_date), \
             week_start_views  = CASE WHEN $17::date IS NULL THEN week_start_views \
                                      ELSE $18 END, \
             cached_at         = NOW(), \
             updated_at        = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(&video.platform)
    .bind(&video.username)
    .bind(video.video_url.as_deref())
    .bind(video.thumbnail_url.as_deref())
    .bind(video.title.as_deref())
    .bind(video.caption.as_deref())
    .bind(video.description.as_deref())
    .bind(video.metrics.views)
    .bind(video.metrics.likes)
    .bind(video.metrics.comments)
    .bind(video.metrics.shares)
    .bind(video.metrics.bookmarks)
    .bind(video.uploaded_at)
    .bind(entry.user_id())
    .bind(entry.social_account_id())
    .bind(baseline.map(|b| b.week_start_date))
    .bind(baseline.map(|b| b.week_start_views))
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

/// Returns every cache entry of a campaign, ordered by video id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_cached_videos(
    pool: &PgPool,
    campaign_id: Uuid,
) -> Result<Vec<CachedVideoRow>, DbError> {
    let rows = sqlx::query_as::<_, CachedVideoRow>(
        "SELECT id, brand_id, campaign_id, shortimize_video_id, platform, username, video_url, \
                views, likes, comments, shares, bookmarks, user_id, social_account_id, \
                matched_at, week_start_date, week_start_views, cached_at \
         FROM cached_campaign_videos \
         WHERE campaign_id = $1 \
         ORDER BY shortimize_video_id",
    )
    .bind(campaign_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
