//! Campaign video sync: fetch each active campaign's videos from Shortimize,
//! filter by hashtags, match creators, cache every video with its weekly
//! baseline, materialize submissions for matches, and snapshot metrics.
//!
//! Brands, campaigns, and videos are processed sequentially. Failures are
//! isolated at each level and recorded on the report instead of aborting the
//! run.

mod brand;
mod campaign;
pub mod report;
pub mod runner;
pub mod snapshot;
mod videos;

pub use report::{BrandSyncResult, CampaignSyncResult, SyncReport, SyncRequest};
pub use runner::{PlannedCampaign, SyncRunner, SyncSettings, TriggerSource};
pub use snapshot::record_campaign_snapshot;
