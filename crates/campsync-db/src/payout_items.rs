//! Moderation state on `submission_payout_items`.
//!
//! Every mutation is a guarded `UPDATE` whose `WHERE` clause encodes the
//! allowed source state. Zero affected rows means the item was not in that
//! state and surfaces as [`DbError::InvalidTransition`].

use campsync_core::ClawbackStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A payout item with the creator of its submission.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PayoutItemRow {
    pub id: Uuid,
    pub payout_request_id: Uuid,
    pub submission_id: Uuid,
    pub creator_id: Uuid,
    pub amount: Decimal,
    pub flagged_at: Option<DateTime<Utc>>,
    pub flagged_by: Option<Uuid>,
    pub flag_reason: Option<String>,
    pub clawback_status: Option<String>,
    pub clawback_reason: Option<String>,
    pub clawed_back_at: Option<DateTime<Utc>>,
    pub clawed_back_by: Option<Uuid>,
}

impl PayoutItemRow {
    #[must_use]
    pub fn status(&self) -> Option<ClawbackStatus> {
        ClawbackStatus::parse(self.clawback_status.as_deref())
    }

    #[must_use]
    pub fn is_flagged(&self) -> bool {
        self.flagged_at.is_some()
    }
}

/// A flagged item awaiting a decision, joined with its submission and the
/// clearing window of its payout request.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FlaggedPayoutItemRow {
    pub id: Uuid,
    pub payout_request_id: Uuid,
    pub submission_id: Uuid,
    pub creator_id: Uuid,
    pub amount: Decimal,
    pub flagged_at: DateTime<Utc>,
    pub flagged_by: Option<Uuid>,
    pub flag_reason: Option<String>,
    pub clawback_status: Option<String>,
    pub platform: String,
    pub video_url: String,
    pub video_title: Option<String>,
    pub clearing_ends_at: DateTime<Utc>,
}

const PAYOUT_ITEM_COLUMNS: &str = "i.id, i.payout_request_id, i.submission_id, s.creator_id, \
     i.amount, i.flagged_at, i.flagged_by, i.flag_reason, i.clawback_status, \
     i.clawback_reason, i.clawed_back_at, i.clawed_back_by";

/// Fetches one payout item by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, or [`DbError::Sqlx`] if
/// the query fails.
pub async fn get_payout_item(pool: &PgPool, id: Uuid) -> Result<PayoutItemRow, DbError> {
    let sql = format!(
        "SELECT {PAYOUT_ITEM_COLUMNS} \
         FROM submission_payout_items i \
         JOIN video_submissions s ON s.id = i.submission_id \
         WHERE i.id = $1"
    );
    sqlx::query_as::<_, PayoutItemRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Returns flagged items still awaiting a decision, newest flag first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_pending_flagged_items(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<FlaggedPayoutItemRow>, DbError> {
    let rows = sqlx::query_as::<_, FlaggedPayoutItemRow>(
        "SELECT i.id, i.payout_request_id, i.submission_id, s.creator_id, i.amount, \
                i.flagged_at, i.flagged_by, i.flag_reason, i.clawback_status, \
                s.platform, s.video_url, s.video_title, r.clearing_ends_at \
         FROM submission_payout_items i \
         JOIN video_submissions s ON s.id = i.submission_id \
         JOIN submission_payout_requests r ON r.id = i.payout_request_id \
         WHERE i.flagged_at IS NOT NULL \
           AND (i.clawback_status IS NULL OR i.clawback_status = 'pending_review') \
         ORDER BY i.flagged_at DESC, i.id \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Flags an unflagged item for review and marks its submission flagged.
///
/// Both writes happen in one transaction.
///
/// # Errors
///
/// Returns [`DbError::InvalidTransition`] if the item is already flagged or
/// decided, or [`DbError::Sqlx`] if a query fails.
pub async fn flag_payout_item(
    pool: &PgPool,
    id: Uuid,
    flagged_by: Option<Uuid>,
    reason: Option<&str>,
) -> Result<PayoutItemRow, DbError> {
    let mut tx = pool.begin().await?;

    let submission_id = sqlx::query_scalar::<_, Uuid>(
        "UPDATE submission_payout_items \
         SET flagged_at = NOW(), flagged_by = $2, flag_reason = $3, \
             clawback_status = 'pending_review' \
         WHERE id = $1 AND flagged_at IS NULL AND clawback_status IS NULL \
         RETURNING submission_id",
    )
    .bind(id)
    .bind(flagged_by)
    .bind(reason)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::InvalidTransition {
        id,
        target: ClawbackStatus::PendingReview.as_str(),
    })?;

    sqlx::query("UPDATE video_submissions SET is_flagged = true, updated_at = NOW() WHERE id = $1")
        .bind(submission_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    get_payout_item(pool, id).await
}

/// Clears a pending flag and unflags the submission, in one transaction.
///
/// # Errors
///
/// Returns [`DbError::InvalidTransition`] if the item is not pending review,
/// or [`DbError::Sqlx`] if a query fails.
pub async fn clear_payout_item_flag(
    pool: &PgPool,
    id: Uuid,
    cleared_by: Option<Uuid>,
) -> Result<PayoutItemRow, DbError> {
    let mut tx = pool.begin().await?;

    let submission_id = sqlx::query_scalar::<_, Uuid>(
        "UPDATE submission_payout_items \
         SET clawback_status = 'cleared', clawed_back_at = NOW(), clawed_back_by = $2 \
         WHERE id = $1 \
           AND flagged_at IS NOT NULL \
           AND (clawback_status IS NULL OR clawback_status = 'pending_review') \
         RETURNING submission_id",
    )
    .bind(id)
    .bind(cleared_by)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::InvalidTransition {
        id,
        target: ClawbackStatus::Cleared.as_str(),
    })?;

    sqlx::query("UPDATE video_submissions SET is_flagged = false, updated_at = NOW() WHERE id = $1")
        .bind(submission_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    get_payout_item(pool, id).await
}

/// Claims a pending item for clawback before the settlement function runs.
///
/// The reason and reviewer are stored with the claim. While the claim is
/// held the item can be neither cleared nor claimed again.
///
/// # Errors
///
/// Returns [`DbError::InvalidTransition`] if the item is not pending review,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn claim_payout_item_clawback(
    pool: &PgPool,
    id: Uuid,
    claimed_by: Option<Uuid>,
    reason: &str,
) -> Result<PayoutItemRow, DbError> {
    let result = sqlx::query(
        "UPDATE submission_payout_items \
         SET clawback_status = 'clawback_in_progress', \
             clawback_reason = $3, clawed_back_by = $2 \
         WHERE id = $1 \
           AND flagged_at IS NOT NULL \
           AND (clawback_status IS NULL OR clawback_status = 'pending_review')",
    )
    .bind(id)
    .bind(claimed_by)
    .bind(reason)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidTransition {
            id,
            target: ClawbackStatus::ClawedBack.as_str(),
        });
    }

    get_payout_item(pool, id).await
}

/// Returns a claimed item to pending review after a failed settlement.
///
/// Returns `false` when the item no longer holds a claim.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn release_payout_item_clawback(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE submission_payout_items \
         SET clawback_status = 'pending_review', \
             clawback_reason = NULL, clawed_back_by = NULL \
         WHERE id = $1 AND clawback_status = 'clawback_in_progress'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Records a settled clawback on a claimed item.
///
/// The settlement function may already have written `clawed_back` itself,
/// so that state is accepted and only missing fields are filled in.
///
/// # Errors
///
/// Returns [`DbError::InvalidTransition`] if the item holds no clawback
/// claim, or [`DbError::Sqlx`] if the update fails.
pub async fn mark_payout_item_clawed_back(
    pool: &PgPool,
    id: Uuid,
    clawed_back_by: Option<Uuid>,
    reason: &str,
) -> Result<PayoutItemRow, DbError> {
    let result = sqlx::query(
        "UPDATE submission_payout_items \
         SET clawback_status = 'clawed_back', \
             clawback_reason = COALESCE(clawback_reason, $3), \
             clawed_back_at  = COALESCE(clawed_back_at, NOW()), \
             clawed_back_by  = COALESCE(clawed_back_by, $2) \
         WHERE id = $1 \
           AND flagged_at IS NOT NULL \
           AND clawback_status IN ('clawback_in_progress', 'clawed_back')",
    )
    .bind(id)
    .bind(clawed_back_by)
    .bind(reason)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidTransition {
            id,
            target: ClawbackStatus::ClawedBack.as_str(),
        });
    }

    get_payout_item(pool, id).await
}
