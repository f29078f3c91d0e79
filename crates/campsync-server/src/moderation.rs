//! Moderation gate over payout items: flag, clear, clawback.
//!
//! Each action first loads the item and checks the transition in memory so
//! the caller gets a precise error, then performs the guarded database
//! update, which stays authoritative under concurrent reviewers.

use campsync_core::{
    clawback_reason, ClawbackStatus, ModerationAction, FLAG_CLEARED_MESSAGE,
};
use campsync_db::{DbError, PayoutItemRow};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::functions::{FunctionsClient, FunctionsError};

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("payout item not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("clawback requires explicit confirmation")]
    ConfirmationRequired,

    #[error("settlement functions are not configured")]
    FunctionsUnavailable,

    #[error("settlement function failed: {0}")]
    Upstream(#[source] FunctionsError),

    #[error(transparent)]
    Db(DbError),
}

impl From<DbError> for ModerationError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => Self::NotFound,
            DbError::InvalidTransition { .. } => Self::Conflict(err.to_string()),
            other => Self::Db(other),
        }
    }
}

/// Input for a clawback decision.
#[derive(Debug, Clone, Default)]
pub struct ClawbackInput<'a> {
    pub confirm: bool,
    pub reason: Option<&'a str>,
    pub reviewer: Option<Uuid>,
}

fn state_label(item: &PayoutItemRow) -> &'static str {
    match item.status() {
        Some(status) => status.as_str(),
        None if item.is_flagged() => ClawbackStatus::PendingReview.as_str(),
        None => "unflagged",
    }
}

async fn load_for(
    pool: &PgPool,
    id: Uuid,
    action: ModerationAction,
) -> Result<PayoutItemRow, ModerationError> {
    let item = campsync_db::get_payout_item(pool, id).await?;
    if action.allowed_from(item.is_flagged(), item.status()) {
        return Ok(item);
    }
    let message = match item.status() {
        Some(status) if status.is_terminal() => {
            format!("payout item {id} was already decided as '{status}'")
        }
        _ => format!(
            "payout item {id} cannot move to '{}' while {}",
            action.target(),
            state_label(&item)
        ),
    };
    Err(ModerationError::Conflict(message))
}

/// Flag an unflagged item for review.
///
/// # Errors
///
/// Returns [`ModerationError::NotFound`] or [`ModerationError::Conflict`]
/// when the item is missing or already flagged.
pub async fn flag_item(
    pool: &PgPool,
    id: Uuid,
    reviewer: Option<Uuid>,
    reason: Option<&str>,
) -> Result<PayoutItemRow, ModerationError> {
    load_for(pool, id, ModerationAction::Flag).await?;
    let reason = reason.map(str::trim).filter(|r| !r.is_empty());
    let item = campsync_db::flag_payout_item(pool, id, reviewer, reason).await?;
    tracing::info!(payout_item = %id, "payout item flagged for review");
    Ok(item)
}

/// Clear a pending flag and notify the creator.
///
/// The notification is best-effort: a failure is logged and the clear stands.
///
/// # Errors
///
/// Returns [`ModerationError::NotFound`] or [`ModerationError::Conflict`]
/// when the item is missing or not pending review.
pub async fn clear_item(
    pool: &PgPool,
    functions: Option<&FunctionsClient>,
    id: Uuid,
    reviewer: Option<Uuid>,
) -> Result<PayoutItemRow, ModerationError> {
    load_for(pool, id, ModerationAction::Clear).await?;
    let item = campsync_db::clear_payout_item_flag(pool, id, reviewer).await?;
    tracing::info!(payout_item = %id, "payout item flag cleared");

    match functions {
        Some(functions) => {
            if let Err(e) = functions
                .send_direct_message(item.creator_id, FLAG_CLEARED_MESSAGE)
                .await
            {
                tracing::warn!(
                    payout_item = %id,
                    creator = %item.creator_id,
                    error = %e,
                    "failed to notify creator of cleared flag"
                );
            }
        }
        None => {
            tracing::warn!(payout_item = %id, "functions not configured, creator not notified");
        }
    }

    Ok(item)
}

/// Claw back a flagged payout through the settlement function, then record
/// the decision.
///
/// The item is claimed (`clawback_in_progress`) before the settlement
/// function is called, so a concurrent clear fails with a conflict instead
/// of landing on a reversed payout. A failed settlement releases the claim.
///
/// # Errors
///
/// Returns [`ModerationError::ConfirmationRequired`] without `confirm`,
/// [`ModerationError::NotFound`] / [`ModerationError::Conflict`] for a
/// missing, claimed or already decided item, and
/// [`ModerationError::Upstream`] when the settlement function fails, after
/// which the item is back in pending review.
pub async fn claw_back_item(
    pool: &PgPool,
    functions: Option<&FunctionsClient>,
    id: Uuid,
    input: ClawbackInput<'_>,
) -> Result<PayoutItemRow, ModerationError> {
    if !input.confirm {
        return Err(ModerationError::ConfirmationRequired);
    }
    load_for(pool, id, ModerationAction::Clawback).await?;

    let functions = functions.ok_or(ModerationError::FunctionsUnavailable)?;
    let reason = clawback_reason(input.reason);

    campsync_db::claim_payout_item_clawback(pool, id, input.reviewer, &reason).await?;

    if let Err(e) = functions.execute_clawback(id, &reason).await {
        match campsync_db::release_payout_item_clawback(pool, id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(payout_item = %id, "clawback claim was already gone on release");
            }
            Err(release_err) => tracing::error!(
                payout_item = %id,
                error = %release_err,
                "failed to release clawback claim"
            ),
        }
        return Err(ModerationError::Upstream(e));
    }

    let item = campsync_db::mark_payout_item_clawed_back(pool, id, input.reviewer, &reason)
        .await
        .inspect_err(|e| {
            tracing::error!(
                payout_item = %id,
                error = %e,
                "settlement succeeded but clawback was not recorded"
            );
        })?;
    tracing::info!(payout_item = %id, reason = %reason, "payout item clawed back");
    Ok(item)
}
