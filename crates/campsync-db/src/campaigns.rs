//! Database operations for the `campaigns` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CampaignRow {
    pub id: Uuid,
    pub brand_id: Uuid,
    pub title: String,
    pub status: String,
    pub shortimize_collection_name: Option<String>,
    /// `NULL` in the database decodes as an empty list.
    pub hashtags: Vec<String>,
}

/// Returns the brand's `active` campaigns, optionally narrowed to one id.
///
/// Eligibility (collection or hashtags) is decided by the caller.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_campaigns(
    pool: &PgPool,
    brand_id: Uuid,
    campaign_id: Option<Uuid>,
) -> Result<Vec<CampaignRow>, DbError> {
    let rows = sqlx::query_as::<_, CampaignRow>(
        "SELECT id, brand_id, title, status, shortimize_collection_name, \
                COALESCE(hashtags, ARRAY[]::text[]) AS hashtags \
         FROM campaigns \
         WHERE brand_id = $1 \
           AND status = 'active' \
           AND ($2::uuid IS NULL OR id = $2) \
         ORDER BY created_at, id",
    )
    .bind(brand_id)
    .bind(campaign_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
