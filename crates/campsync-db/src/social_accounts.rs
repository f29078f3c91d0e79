//! Linked social accounts, read through `social_account_campaigns`.

use campsync_core::LinkedAccount;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// An account joined through its campaign link.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LinkedAccountRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub platform: String,
    pub username: String,
}

impl From<LinkedAccountRow> for LinkedAccount {
    fn from(row: LinkedAccountRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            platform: row.platform,
            username: row.username,
        }
    }
}

/// Returns the accounts linked to a campaign through an `active` link.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_linked_accounts(
    pool: &PgPool,
    campaign_id: Uuid,
) -> Result<Vec<LinkedAccountRow>, DbError> {
    let rows = sqlx::query_as::<_, LinkedAccountRow>(
        "SELECT sa.id, sa.user_id, sa.platform, sa.username \
         FROM social_account_campaigns sac \
         JOIN social_accounts sa ON sa.id = sac.social_account_id \
         WHERE sac.campaign_id = $1 AND sac.status = 'active' \
         ORDER BY sac.connected_at, sa.id",
    )
    .bind(campaign_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
