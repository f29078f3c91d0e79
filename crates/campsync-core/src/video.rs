use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Engagement counters carried by a collected video, a submission, or a
/// metrics rollup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetrics {
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub bookmarks: i64,
}

/// A video performance record from the analytics provider, normalized for
/// filtering, matching, and storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectedVideo {
    /// Provider-side identifier (Shortimize `ad_id`).
    pub external_id: String,
    pub username: String,
    pub platform: String,
    pub video_url: Option<String>,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub metrics: VideoMetrics,
}

impl CollectedVideo {
    /// Lowercased `title caption description`, the text searched for hashtags.
    #[must_use]
    pub fn search_text(&self) -> String {
        [
            self.title.as_deref().unwrap_or_default(),
            self.caption.as_deref().unwrap_or_default(),
            self.description.as_deref().unwrap_or_default(),
        ]
        .join(" ")
        .to_lowercase()
    }

    /// Text stored as a submission's description: caption, then description.
    #[must_use]
    pub fn submission_description(&self) -> Option<&str> {
        self.caption.as_deref().or(self.description.as_deref())
    }
}

#[cfg(test)]
pub(crate) fn sample_video(id: &str, platform: &str, username: &str) -> CollectedVideo {
    CollectedVideo {
        external_id: id.to_string(),
        username: username.to_string(),
        platform: platform.to_string(),
        video_url: Some(format!("https://{platform}.example.com/{id}")),
        title: None,
        caption: None,
        description: None,
        thumbnail_url: None,
        uploaded_at: None,
        metrics: VideoMetrics {
            views: 100,
            ..VideoMetrics::default()
        },
    }
}
