//! Request and response shapes of a sync invocation.
//!
//! Field names serialize in camelCase; this is the JSON returned by the
//! trigger endpoint.

use campsync_db::{BrandRow, CampaignRow};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Narrowing options for one invocation. Every field is optional, so an
/// empty or missing body means "all eligible brands and campaigns".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncRequest {
    pub brand_id: Option<Uuid>,
    pub campaign_id: Option<Uuid>,
    /// Sync even if the campaign completed a sync within the minimum interval.
    pub force_refresh: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSyncResult {
    pub campaign_id: Uuid,
    pub campaign_title: String,
    pub videos_found: usize,
    pub videos_matched: usize,
    pub videos_unmatched: usize,
    /// Distinct provider usernames that matched a linked account.
    pub accounts_updated: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CampaignSyncResult {
    /// A campaign that was visited but had nothing to process.
    #[must_use]
    pub fn empty(campaign: &CampaignRow) -> Self {
        Self {
            campaign_id: campaign.id,
            campaign_title: campaign.title.clone(),
            videos_found: 0,
            videos_matched: 0,
            videos_unmatched: 0,
            accounts_updated: Vec::new(),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(campaign: &CampaignRow, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::empty(campaign)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandSyncResult {
    pub brand_id: Uuid,
    pub brand_name: String,
    pub campaigns: Vec<CampaignSyncResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BrandSyncResult {
    #[must_use]
    pub fn new(brand: &BrandRow, campaigns: Vec<CampaignSyncResult>) -> Self {
        Self {
            brand_id: brand.id,
            brand_name: brand.name.clone(),
            campaigns,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(brand: &BrandRow, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(brand, Vec::new())
        }
    }

    #[must_use]
    pub fn videos_matched(&self) -> usize {
        self.campaigns.iter().map(|c| c.videos_matched).sum()
    }

    #[must_use]
    pub fn videos_unmatched(&self) -> usize {
        self.campaigns.iter().map(|c| c.videos_unmatched).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub total_videos_matched: usize,
    pub total_videos_unmatched: usize,
    pub total_brands_processed: usize,
    pub results: Vec<BrandSyncResult>,
}

impl SyncReport {
    /// Report for a run where no brand carries a provider key.
    #[must_use]
    pub fn no_brands() -> Self {
        Self {
            success: true,
            message: Some("No brands to sync".to_string()),
            total_videos_matched: 0,
            total_videos_unmatched: 0,
            total_brands_processed: 0,
            results: Vec::new(),
        }
    }

    /// Fold per-brand results into the final report.
    #[must_use]
    pub fn from_results(results: Vec<BrandSyncResult>) -> Self {
        Self {
            success: true,
            message: None,
            total_videos_matched: results.iter().map(BrandSyncResult::videos_matched).sum(),
            total_videos_unmatched: results.iter().map(BrandSyncResult::videos_unmatched).sum(),
            total_brands_processed: results.len(),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn campaign(title: &str) -> CampaignRow {
        CampaignRow {
            id: Uuid::nil(),
            brand_id: Uuid::nil(),
            title: title.to_string(),
            status: "active".to_string(),
            shortimize_collection_name: None,
            hashtags: Vec::new(),
        }
    }

    fn brand() -> BrandRow {
        BrandRow {
            id: Uuid::nil(),
            name: "Acme".to_string(),
            shortimize_api_key: Some("key".to_string()),
            collection_name: Some("promoX".to_string()),
        }
    }

    #[test]
    fn request_accepts_empty_object() {
        let request: SyncRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, SyncRequest::default());
    }

    #[test]
    fn request_reads_camel_case_fields() {
        let request: SyncRequest = serde_json::from_value(json!({
            "brandId": "00000000-0000-0000-0000-000000000001",
            "forceRefresh": true
        }))
        .unwrap();
        assert!(request.brand_id.is_some());
        assert!(request.campaign_id.is_none());
        assert!(request.force_refresh);
    }

    #[test]
    fn report_totals_sum_campaigns() {
        let mut first = CampaignSyncResult::empty(&campaign("One"));
        first.videos_matched = 2;
        first.videos_unmatched = 1;
        let mut second = CampaignSyncResult::empty(&campaign("Two"));
        second.videos_matched = 3;

        let report = SyncReport::from_results(vec![
            BrandSyncResult::new(&brand(), vec![first, second]),
            BrandSyncResult::failed(&brand(), "boom"),
        ]);

        assert_eq!(report.total_videos_matched, 5);
        assert_eq!(report.total_videos_unmatched, 1);
        assert_eq!(report.total_brands_processed, 2);
    }

    #[test]
    fn report_serializes_in_camel_case_without_empty_errors() {
        let report =
            SyncReport::from_results(vec![BrandSyncResult::new(&brand(), vec![
                CampaignSyncResult::failed(&campaign("One"), "Shortimize API error: 401"),
            ])]);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["success"], json!(true));
        assert_eq!(value["totalBrandsProcessed"], json!(1));
        assert!(value.get("message").is_none());
        assert!(value["results"][0].get("error").is_none());
        assert_eq!(
            value["results"][0]["campaigns"][0]["error"],
            json!("Shortimize API error: 401")
        );
        assert_eq!(value["results"][0]["campaigns"][0]["accountsUpdated"], json!([]));
    }

    #[test]
    fn no_brands_report_has_message() {
        let value = serde_json::to_value(SyncReport::no_brands()).unwrap();
        assert_eq!(value["message"], json!("No brands to sync"));
        assert_eq!(value["totalVideosMatched"], json!(0));
        assert_eq!(value["results"], json!([]));
    }
}
