//! `sync` command: run the campaign video sync once from the terminal.

use campsync_core::{AppConfig, CollectionScope};
use campsync_sync::{SyncReport, SyncRequest, SyncRunner, TriggerSource};

/// Run one sync, or with `dry_run` list the campaigns it would visit.
///
/// # Errors
///
/// Returns an error if the Shortimize client cannot be built, brands cannot
/// be loaded, or the run cannot be recorded. Per-campaign failures are
/// printed, not returned.
pub(crate) async fn run_sync(
    pool: sqlx::PgPool,
    config: &AppConfig,
    request: &SyncRequest,
    dry_run: bool,
    json: bool,
) -> anyhow::Result<()> {
    let runner = SyncRunner::from_config(pool, config)?;

    if dry_run {
        let planned = runner.plan(request).await?;
        if planned.is_empty() {
            println!("dry-run: no brands with a Shortimize API key and active campaigns");
            return Ok(());
        }
        println!("dry-run: would sync {} campaign(s)", planned.len());
        println!("{:<20}{:<30}SCOPE", "BRAND", "CAMPAIGN");
        for campaign in &planned {
            println!(
                "{:<20}{:<30}{}",
                truncate(&campaign.brand_name, 18),
                truncate(&campaign.campaign_title, 28),
                describe_scope(campaign.scope.as_ref())
            );
        }
        return Ok(());
    }

    tracing::info!(
        brand_id = ?request.brand_id,
        campaign_id = ?request.campaign_id,
        force_refresh = request.force_refresh,
        "starting sync"
    );
    let report = runner.run(request, TriggerSource::Cli).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn describe_scope(scope: Option<&CollectionScope>) -> String {
    match scope {
        None => "skipped (no collection or hashtags)".to_string(),
        Some(scope) => {
            let collection = scope.collection_name().unwrap_or("recent videos");
            if scope.hashtags().is_empty() {
                collection.to_string()
            } else {
                format!("{collection} [{}]", scope.hashtags().join(" "))
            }
        }
    }
}

fn print_report(report: &SyncReport) {
    if let Some(message) = &report.message {
        println!("{message}");
        return;
    }

    for brand in &report.results {
        println!("{}", brand.brand_name);
        if let Some(error) = &brand.error {
            println!("  error: {error}");
        }
        for campaign in &brand.campaigns {
            match &campaign.error {
                Some(error) => println!("  {}: error: {error}", campaign.campaign_title),
                None => println!(
                    "  {}: {} found, {} matched, {} unmatched",
                    campaign.campaign_title,
                    campaign.videos_found,
                    campaign.videos_matched,
                    campaign.videos_unmatched
                ),
            }
        }
    }
    println!(
        "synced {} brand(s): {} matched, {} unmatched",
        report.total_brands_processed, report.total_videos_matched, report.total_videos_unmatched
    );
}

pub(crate) fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() > max_chars {
        format!("{}...", value.chars().take(max_chars.saturating_sub(3)).collect::<String>())
    } else {
        value.to_string()
    }
}
