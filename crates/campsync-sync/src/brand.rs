//! Per-brand step: load the brand's active campaigns and sync each one.

use campsync_db::BrandRow;

use crate::report::{BrandSyncResult, SyncRequest};
use crate::runner::SyncRunner;

impl SyncRunner {
    /// Sync every active campaign of one brand. Never fails: a brand-level
    /// problem is recorded on the returned result.
    pub(crate) async fn sync_brand(
        &self,
        brand: &BrandRow,
        request: &SyncRequest,
    ) -> BrandSyncResult {
        tracing::info!(brand = %brand.name, brand_id = %brand.id, "processing brand");

        let Some(api_key) = brand
            .shortimize_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
        else {
            tracing::warn!(brand = %brand.name, "brand has no Shortimize API key, skipping");
            return BrandSyncResult::failed(brand, "brand has no Shortimize API key");
        };

        let campaigns = match campsync_db::list_active_campaigns(
            &self.pool,
            brand.id,
            request.campaign_id,
        )
        .await
        {
            Ok(campaigns) => campaigns,
            Err(e) => {
                tracing::error!(
                    brand = %brand.name,
                    error = %e,
                    "failed to fetch campaigns"
                );
                return BrandSyncResult::failed(brand, e.to_string());
            }
        };

        if campaigns.is_empty() {
            tracing::info!(brand = %brand.name, "no active campaigns");
            return BrandSyncResult::new(brand, Vec::new());
        }

        tracing::info!(
            brand = %brand.name,
            campaigns = campaigns.len(),
            "found active campaigns"
        );

        let mut results = Vec::with_capacity(campaigns.len());
        for campaign in &campaigns {
            results.push(
                self.sync_campaign(brand, api_key, campaign, request.force_refresh)
                    .await,
            );
        }

        BrandSyncResult::new(brand, results)
    }
}
