//! Read-only listing commands.

use chrono::{DateTime, Utc};

use crate::sync::truncate;

fn fmt_time(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(
        || "-".to_string(),
        |t| t.format("%Y-%m-%d %H:%M").to_string(),
    )
}

/// Print the most recent sync runs.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_runs_list(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = campsync_db::list_sync_runs(pool, limit).await?;
    if runs.is_empty() {
        println!("no sync runs recorded; run `sync` first");
        return Ok(());
    }

    println!(
        "{:<8}{:<11}{:<11}{:<18}{:<8}{:<9}{:<10}ERROR",
        "RUN", "TRIGGER", "STATUS", "STARTED", "BRANDS", "MATCHED", "UNMATCHED"
    );
    for run in &runs {
        println!(
            "{:<8}{:<11}{:<11}{:<18}{:<8}{:<9}{:<10}{}",
            run.id,
            run.trigger_source,
            run.status,
            fmt_time(run.started_at),
            run.brands_processed,
            run.videos_matched,
            run.videos_unmatched,
            run.error_message.as_deref().map(|e| truncate(e, 40)).unwrap_or_default()
        );
    }
    Ok(())
}

/// Print flagged payout items awaiting a decision.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_flagged_list(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let items = campsync_db::list_pending_flagged_items(pool, limit).await?;
    if items.is_empty() {
        println!("no flagged payout items pending review");
        return Ok(());
    }

    let now = Utc::now();
    println!(
        "{:<38}{:<11}{:<11}{:<18}{:<6}REASON",
        "PAYOUT ITEM", "PLATFORM", "AMOUNT", "FLAGGED", "DAYS"
    );
    for item in &items {
        println!(
            "{:<38}{:<11}{:<11}{:<18}{:<6}{}",
            item.id,
            item.platform,
            item.amount.to_string(),
            fmt_time(Some(item.flagged_at)),
            campsync_core::days_remaining(item.clearing_ends_at, now),
            item.flag_reason.as_deref().map(|r| truncate(r, 40)).unwrap_or_default()
        );
    }
    Ok(())
}
