//! Per-campaign sync status in `campaign_video_sync_status`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CampaignSyncStatusRow {
    pub campaign_id: Uuid,
    pub sync_status: String,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub videos_synced: i32,
    pub error_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Returns the status row for a campaign, or `None` if it never synced.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_campaign_sync_status(
    pool: &PgPool,
    campaign_id: Uuid,
) -> Result<Option<CampaignSyncStatusRow>, DbError> {
    let row = sqlx::query_as::<_, CampaignSyncStatusRow>(
        "SELECT campaign_id, sync_status, last_synced_at, videos_synced, error_message, \
                updated_at \
         FROM campaign_video_sync_status \
         WHERE campaign_id = $1",
    )
    .bind(campaign_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Marks a campaign `in_progress`, keeping its previous `last_synced_at`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn mark_campaign_sync_in_progress(
    pool: &PgPool,
    campaign_id: Uuid,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO campaign_video_sync_status (campaign_id, sync_status, updated_at) \
         VALUES ($1, 'in_progress', NOW()) \
         ON CONFLICT (campaign_id) DO UPDATE SET \
             sync_status   = 'in_progress', \
             error_message = NULL, \
             updated_at    = NOW()",
    )
    .bind(campaign_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Marks a campaign `completed` with the number of videos written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn mark_campaign_sync_completed(
    pool: &PgPool,
    campaign_id: Uuid,
    videos_synced: i32,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO campaign_video_sync_status \
             (campaign_id, sync_status, last_synced_at, videos_synced, updated_at) \
         VALUES ($1, 'completed', NOW(), $2, NOW()) \
         ON CONFLICT (campaign_id) DO UPDATE SET \
             sync_status    = 'completed', \
             last_synced_at = NOW(), \
             videos_synced  = EXCLUDED.videos_synced, \
             error_message  = NULL, \
             updated_at     = NOW()",
    )
    .bind(campaign_id)
    .bind(videos_synced)
    .execute(pool)
    .await?;

    Ok(())
}

/// Marks a campaign `failed` with an error message.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn mark_campaign_sync_failed(
    pool: &PgPool,
    campaign_id: Uuid,
    error_message: &str,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO campaign_video_sync_status \
             (campaign_id, sync_status, error_message, updated_at) \
         VALUES ($1, 'failed', $2, NOW()) \
         ON CONFLICT (campaign_id) DO UPDATE SET \
             sync_status   = 'failed', \
             error_message = EXCLUDED.error_message, \
             updated_at    = NOW()",
    )
    .bind(campaign_id)
    .bind(error_message)
    .execute(pool)
    .await?;

    Ok(())
}
