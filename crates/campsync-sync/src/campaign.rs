//! Per-campaign step: fetch, filter, match, cache, submit, snapshot.

use campsync_core::{current_week_start, filter_by_hashtags, AccountIndex, CollectionScope};
use campsync_db::{BrandRow, CampaignRow, DbError, NewCachedVideo};
use campsync_shortimize::ShortimizeError;
use chrono::Utc;
use thiserror::Error;

use crate::report::CampaignSyncResult;
use crate::runner::SyncRunner;
use crate::snapshot::record_campaign_snapshot;
use crate::videos::{write_cache_entry, write_submission};

/// A failure that aborts one campaign. Per-video write failures are logged
/// and do not surface here.
#[derive(Debug, Error)]
pub(crate) enum CampaignSyncError {
    #[error("{}", fetch_message(.0))]
    Fetch(#[from] ShortimizeError),
    #[error("failed to load linked accounts: {0}")]
    LinkedAccounts(#[source] DbError),
}

fn fetch_message(err: &ShortimizeError) -> String {
    match err.status() {
        Some(status) => format!("Shortimize API error: {status}"),
        None => err.to_string(),
    }
}

impl SyncRunner {
    /// Sync one campaign. Never fails: errors are recorded on the result and
    /// in `campaign_video_sync_status`.
    pub(crate) async fn sync_campaign(
        &self,
        brand: &BrandRow,
        api_key: &str,
        campaign: &CampaignRow,
        force_refresh: bool,
    ) -> CampaignSyncResult {
        let Some(scope) = CollectionScope::resolve(
            campaign.shortimize_collection_name.as_deref(),
            brand.collection_name.as_deref(),
            &campaign.hashtags,
        ) else {
            tracing::info!(
                campaign = %campaign.title,
                "campaign has no collection or hashtags, skipping"
            );
            return CampaignSyncResult::empty(campaign);
        };

        if !force_refresh && self.synced_recently(campaign).await {
            tracing::info!(
                campaign = %campaign.title,
                "campaign synced within the minimum interval, skipping"
            );
            return CampaignSyncResult::empty(campaign);
        }

        if let Err(e) = campsync_db::mark_campaign_sync_in_progress(&self.pool, campaign.id).await
        {
            tracing::warn!(campaign = %campaign.title, error = %e, "failed to mark sync in progress");
        }

        match self.sync_campaign_videos(brand, api_key, campaign, &scope).await {
            Ok((result, videos_synced)) => {
                if let Err(e) = campsync_db::mark_campaign_sync_completed(
                    &self.pool,
                    campaign.id,
                    i32::try_from(videos_synced).unwrap_or(i32::MAX),
                )
                .await
                {
                    tracing::warn!(campaign = %campaign.title, error = %e, "failed to mark sync completed");
                }
                result
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!(
                    brand = %brand.name,
                    campaign = %campaign.title,
                    error = %message,
                    "campaign sync failed"
                );
                if let Err(mark_err) =
                    campsync_db::mark_campaign_sync_failed(&self.pool, campaign.id, &message).await
                {
                    tracing::warn!(
                        campaign = %campaign.title,
                        error = %mark_err,
                        "failed to mark sync failed"
                    );
                }
                CampaignSyncResult::failed(campaign, message)
            }
        }
    }

    async fn synced_recently(&self, campaign: &CampaignRow) -> bool {
        let Some(min_interval) = self.settings.min_interval else {
            return false;
        };
        match campsync_db::get_campaign_sync_status(&self.pool, campaign.id).await {
            Ok(Some(status)) if status.sync_status == "completed" => status
                .last_synced_at
                .is_some_and(|at| Utc::now() - at < min_interval),
            Ok(_) => false,
            Err(e) => {
                tracing::warn!(campaign = %campaign.title, error = %e, "failed to read sync status");
                false
            }
        }
    }

    /// Returns the campaign result and the number of videos written to the
    /// cache after filtering.
    async fn sync_campaign_videos(
        &self,
        brand: &BrandRow,
        api_key: &str,
        campaign: &CampaignRow,
        scope: &CollectionScope,
    ) -> Result<(CampaignSyncResult, usize), CampaignSyncError> {
        tracing::info!(
            campaign = %campaign.title,
            collection = ?scope.collection_name(),
            hashtags = scope.hashtags().len(),
            "fetching campaign videos"
        );

        let fetched = self
            .client
            .fetch_collected_videos(api_key, scope.collection_name(), self.settings.page_limit)
            .await?;

        if fetched.is_empty() {
            tracing::info!(campaign = %campaign.title, "no videos returned");
            return Ok((CampaignSyncResult::empty(campaign), 0));
        }

        let fetched_count = fetched.len();
        let videos = filter_by_hashtags(fetched, scope.hashtags());
        if videos.len() != fetched_count {
            tracing::info!(
                campaign = %campaign.title,
                fetched = fetched_count,
                kept = videos.len(),
                "applied hashtag filter"
            );
        }

        let accounts = campsync_db::list_linked_accounts(&self.pool, campaign.id)
            .await
            .map_err(CampaignSyncError::LinkedAccounts)?;
        let index = AccountIndex::new(accounts.into_iter().map(Into::into));
        let outcome = index.partition(&videos);

        let week_start = current_week_start();

        for &(video, account) in &outcome.matched {
            let entry = NewCachedVideo {
                brand_id: brand.id,
                campaign_id: campaign.id,
                video,
                account: Some(account),
            };
            if let Err(e) = write_cache_entry(&self.pool, &entry, week_start).await {
                tracing::error!(video = %video.external_id, error = %e, "failed to cache video");
            }
            if let Err(e) =
                write_submission(&self.pool, campaign.id, brand.id, video, account).await
            {
                tracing::error!(
                    video = %video.external_id,
                    error = %e,
                    "failed to upsert tracked submission"
                );
            }
        }

        for &video in &outcome.unmatched {
            let entry = NewCachedVideo {
                brand_id: brand.id,
                campaign_id: campaign.id,
                video,
                account: None,
            };
            if let Err(e) = write_cache_entry(&self.pool, &entry, week_start).await {
                tracing::error!(video = %video.external_id, error = %e, "failed to cache video");
            }
        }

        if let Err(e) = record_campaign_snapshot(&self.pool, campaign.id, brand.id).await {
            tracing::error!(campaign = %campaign.title, error = %e, "failed to record metrics snapshot");
        }

        tracing::info!(
            campaign = %campaign.title,
            found = videos.len(),
            matched = outcome.matched_count(),
            unmatched = outcome.unmatched_count(),
            "campaign sync complete"
        );

        let result = CampaignSyncResult {
            campaign_id: campaign.id,
            campaign_title: campaign.title.clone(),
            videos_found: videos.len(),
            videos_matched: outcome.matched_count(),
            videos_unmatched: outcome.unmatched_count(),
            accounts_updated: outcome.matched_usernames(),
            error: None,
        };
        Ok((result, videos.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_use_provider_message() {
        let err = CampaignSyncError::from(ShortimizeError::UnexpectedStatus {
            status: 401,
            url: "https://api.shortimize.com/videos".to_string(),
        });
        assert_eq!(err.to_string(), "Shortimize API error: 401");
    }

    #[test]
    fn server_errors_use_provider_message() {
        let err = CampaignSyncError::from(ShortimizeError::ServerError {
            status: 502,
            url: "https://api.shortimize.com/videos".to_string(),
        });
        assert_eq!(err.to_string(), "Shortimize API error: 502");
    }

    #[test]
    fn account_errors_name_the_step() {
        let err = CampaignSyncError::LinkedAccounts(DbError::NotFound);
        assert_eq!(
            err.to_string(),
            "failed to load linked accounts: record not found"
        );
    }
}
