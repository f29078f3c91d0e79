//! Campaign hashtag filtering.
//!
//! A video passes when its combined lowercase text contains, for at least
//! one configured tag, the bare tag or the tag prefixed with `#`. An empty
//! tag list passes everything.

use crate::video::CollectedVideo;

/// Lowercase a configured tag and strip one leading `#`.
#[must_use]
pub fn normalize_hashtag(tag: &str) -> String {
    let lowered = tag.trim().to_lowercase();
    match lowered.strip_prefix('#') {
        Some(rest) => rest.to_string(),
        None => lowered,
    }
}

fn normalized_tags(hashtags: &[String]) -> Vec<String> {
    hashtags
        .iter()
        .map(|t| normalize_hashtag(t))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Returns `true` if `video` carries any of `hashtags`.
#[must_use]
pub fn video_matches_hashtags(video: &CollectedVideo, hashtags: &[String]) -> bool {
    let tags = normalized_tags(hashtags);
    if tags.is_empty() {
        return true;
    }
    let text = video.search_text();
    tags.iter()
        .any(|tag| text.contains(&format!("#{tag}")) || text.contains(tag.as_str()))
}

/// Keep only the videos that carry any of `hashtags`.
///
/// Identity when `hashtags` is empty (or only blank tags).
#[must_use]
pub fn filter_by_hashtags(videos: Vec<CollectedVideo>, hashtags: &[String]) -> Vec<CollectedVideo> {
    if normalized_tags(hashtags).is_empty() {
        return videos;
    }
    videos
        .into_iter()
        .filter(|v| video_matches_hashtags(v, hashtags))
        .collect()
}
