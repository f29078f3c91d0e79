use serde::Deserialize;

/// Top-level response of `GET /videos`.
#[derive(Debug, Deserialize)]
pub struct ShortimizeVideosResponse {
    /// A missing or `null` array is treated as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<ShortimizeVideo>,
    #[serde(default)]
    pub pagination: Option<ShortimizePagination>,
}

#[derive(Debug, Deserialize)]
pub struct ShortimizePagination {
    #[serde(default)]
    pub total: Option<u64>,
}

/// One video performance record as returned by the provider.
///
/// Counters and text fields are all optional on the wire; normalization
/// turns them into zeros and `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShortimizeVideo {
    pub ad_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub platform: String,
    pub ad_link: Option<String>,
    pub latest_views: Option<i64>,
    pub latest_likes: Option<i64>,
    pub latest_comments: Option<i64>,
    pub latest_shares: Option<i64>,
    pub latest_bookmarks: Option<i64>,
    pub uploaded_at: Option<String>,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ShortimizeVideo>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<ShortimizeVideo>>::deserialize(deserializer)?.unwrap_or_default())
}
