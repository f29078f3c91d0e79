//! Sync orchestration: one `sync_runs` row per invocation, brands in order.

use anyhow::Context as _;
use campsync_core::{AppConfig, CollectionScope};
use campsync_db::SyncRunTotals;
use campsync_shortimize::ShortimizeClient;
use sqlx::PgPool;
use uuid::Uuid;

use crate::report::{SyncReport, SyncRequest};

/// Who started a run. Stored on the `sync_runs` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    Http,
    Scheduler,
    Cli,
}

impl TriggerSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Scheduler => "scheduler",
            Self::Cli => "cli",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SyncSettings {
    /// `limit` sent to the provider for each campaign fetch.
    pub page_limit: u32,
    /// Campaigns that completed a sync more recently than this are skipped
    /// unless the request forces a refresh. `None` disables the check.
    pub min_interval: Option<chrono::Duration>,
}

impl SyncSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        let min_interval = (config.sync_min_interval_secs > 0)
            .then(|| i64::try_from(config.sync_min_interval_secs).unwrap_or(i64::MAX))
            .map(chrono::Duration::seconds);
        Self {
            page_limit: config.shortimize_page_limit,
            min_interval,
        }
    }
}

/// A campaign a sync would visit, with its resolved collection scope.
/// `scope` is `None` for campaigns that would be skipped.
#[derive(Debug, Clone)]
pub struct PlannedCampaign {
    pub brand_id: Uuid,
    pub brand_name: String,
    pub campaign_id: Uuid,
    pub campaign_title: String,
    pub scope: Option<CollectionScope>,
}

pub struct SyncRunner {
    pub(crate) pool: PgPool,
    pub(crate) client: ShortimizeClient,
    pub(crate) settings: SyncSettings,
}

impl SyncRunner {
    #[must_use]
    pub fn new(pool: PgPool, client: ShortimizeClient, settings: SyncSettings) -> Self {
        Self {
            pool,
            client,
            settings,
        }
    }

    /// Build a runner with a Shortimize client configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the Shortimize client cannot be constructed.
    pub fn from_config(pool: PgPool, config: &AppConfig) -> anyhow::Result<Self> {
        let client = ShortimizeClient::new(
            &config.shortimize_base_url,
            config.shortimize_request_timeout_secs,
            &config.user_agent,
            config.shortimize_max_retries,
            config.shortimize_retry_backoff_base_ms,
        )
        .map_err(|e| anyhow::anyhow!("failed to build Shortimize client: {e}"))?;
        Ok(Self::new(pool, client, SyncSettings::from_app_config(config)))
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run one sync invocation and record it in `sync_runs`.
    ///
    /// Per-brand and per-campaign failures are captured in the report. Only
    /// failures outside that loop (creating the run, loading brands) are
    /// returned as errors; the run is then marked failed.
    ///
    /// # Errors
    ///
    /// Returns an error if the run cannot be recorded or brands cannot be
    /// loaded.
    pub async fn run(
        &self,
        request: &SyncRequest,
        trigger: TriggerSource,
    ) -> anyhow::Result<SyncReport> {
        let run = campsync_db::create_sync_run(
            &self.pool,
            trigger.as_str(),
            request.brand_id,
            request.campaign_id,
        )
        .await?;
        if let Err(e) = campsync_db::start_sync_run(&self.pool, run.id).await {
            self.fail_run_best_effort(run.id, format!("{e:#}")).await;
            return Err(e.into());
        }

        tracing::info!(
            run_id = run.id,
            trigger = trigger.as_str(),
            brand = ?request.brand_id,
            campaign = ?request.campaign_id,
            force_refresh = request.force_refresh,
            "starting campaign video sync"
        );

        let report = match self.sync_brands(request).await {
            Ok(report) => report,
            Err(e) => {
                self.fail_run_best_effort(run.id, format!("{e:#}")).await;
                return Err(e);
            }
        };

        let totals = SyncRunTotals {
            brands_processed: clamp_i32(report.total_brands_processed),
            videos_matched: clamp_i32(report.total_videos_matched),
            videos_unmatched: clamp_i32(report.total_videos_unmatched),
        };
        if let Err(e) = campsync_db::complete_sync_run(&self.pool, run.id, totals).await {
            self.fail_run_best_effort(run.id, format!("{e:#}")).await;
            return Err(e.into());
        }

        tracing::info!(
            run_id = run.id,
            brands = report.total_brands_processed,
            matched = report.total_videos_matched,
            unmatched = report.total_videos_unmatched,
            "campaign video sync complete"
        );
        Ok(report)
    }

    /// List the campaigns a run with `request` would visit, without calling
    /// the provider or writing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if brands or campaigns cannot be loaded.
    pub async fn plan(&self, request: &SyncRequest) -> anyhow::Result<Vec<PlannedCampaign>> {
        let brands = campsync_db::list_sync_brands(&self.pool, request.brand_id)
            .await
            .context("failed to fetch brands")?;

        let mut planned = Vec::new();
        for brand in &brands {
            let campaigns =
                campsync_db::list_active_campaigns(&self.pool, brand.id, request.campaign_id)
                    .await
                    .with_context(|| format!("failed to fetch campaigns for {}", brand.name))?;
            planned.extend(campaigns.into_iter().map(|c| PlannedCampaign {
                brand_id: brand.id,
                brand_name: brand.name.clone(),
                campaign_id: c.id,
                scope: CollectionScope::resolve(
                    c.shortimize_collection_name.as_deref(),
                    brand.collection_name.as_deref(),
                    &c.hashtags,
                ),
                campaign_title: c.title,
            }));
        }
        Ok(planned)
    }

    async fn sync_brands(&self, request: &SyncRequest) -> anyhow::Result<SyncReport> {
        let brands = campsync_db::list_sync_brands(&self.pool, request.brand_id)
            .await
            .context("failed to fetch brands")?;

        if brands.is_empty() {
            tracing::info!("no brands with a Shortimize API key");
            return Ok(SyncReport::no_brands());
        }

        tracing::info!(brands = brands.len(), "found brands with Shortimize API keys");

        let mut results = Vec::with_capacity(brands.len());
        for brand in &brands {
            results.push(self.sync_brand(brand, request).await);
        }

        Ok(SyncReport::from_results(results))
    }

    async fn fail_run_best_effort(&self, run_id: i64, message: String) {
        if let Err(mark_err) = campsync_db::fail_sync_run(&self.pool, run_id, &message).await {
            tracing::error!(
                run_id,
                error = %mark_err,
                "failed to mark sync run as failed"
            );
        }
    }
}

fn clamp_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
