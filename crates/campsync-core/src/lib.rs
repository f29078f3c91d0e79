pub mod app_config;
pub mod campaign;
mod config;
pub mod hashtags;
pub mod matching;
pub mod metrics;
pub mod moderation;
pub mod video;
pub mod week;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use campaign::{CollectionScope, SourceType, SubmissionStatus};
pub use config::{load_app_config, load_app_config_from_env};
pub use hashtags::{filter_by_hashtags, normalize_hashtag, video_matches_hashtags};
pub use matching::{account_key, normalize_username, AccountIndex, LinkedAccount, MatchOutcome};
pub use metrics::MetricTotals;
pub use moderation::{
    clawback_reason, days_remaining, ClawbackStatus, ModerationAction, DEFAULT_CLAWBACK_REASON,
    FLAG_CLEARED_MESSAGE,
};
pub use video::{CollectedVideo, VideoMetrics};
pub use week::{current_week_start, decide_baseline, week_start_for, BaselineDecision, WeekBaseline};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
