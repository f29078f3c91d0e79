//! Conversion from Shortimize wire records to [`CollectedVideo`].

use campsync_core::{CollectedVideo, VideoMetrics};
use chrono::{DateTime, Utc};

use crate::types::ShortimizeVideo;

/// Normalizes a raw record: missing counters become `0`, empty or
/// whitespace-only strings become `None`, and an unparseable upload time is
/// dropped.
#[must_use]
pub fn normalize_video(raw: ShortimizeVideo) -> CollectedVideo {
    let uploaded_at = raw.uploaded_at.as_deref().and_then(parse_timestamp);
    if uploaded_at.is_none() && raw.uploaded_at.as_deref().is_some_and(|s| !s.trim().is_empty()) {
        tracing::debug!(video_id = %raw.ad_id, "ignoring unparseable uploaded_at");
    }

    CollectedVideo {
        external_id: raw.ad_id,
        username: raw.username,
        platform: raw.platform,
        video_url: non_empty(raw.ad_link),
        title: non_empty(raw.title),
        caption: non_empty(raw.caption),
        description: non_empty(raw.description),
        thumbnail_url: non_empty(raw.thumbnail_url),
        uploaded_at,
        metrics: VideoMetrics {
            views: raw.latest_views.unwrap_or(0),
            likes: raw.latest_likes.unwrap_or(0),
            comments: raw.latest_comments.unwrap_or(0),
            shares: raw.latest_shares.unwrap_or(0),
            bookmarks: raw.latest_bookmarks.unwrap_or(0),
        },
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Accepts RFC 3339 and the space-separated form Postgres-backed APIs emit.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z"))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
