use std::time::Duration;

use campsync_core::CollectedVideo;
use reqwest::{Client, StatusCode, Url};

use crate::error::ShortimizeError;
use crate::normalize::normalize_video;
use crate::rate_limit::retry_with_backoff;
use crate::types::{ShortimizeVideo, ShortimizeVideosResponse};

/// HTTP client for the Shortimize `GET /videos` endpoint.
///
/// One request returns up to `limit` videos ordered by most recently updated
/// metrics; there is no cursor. Transient errors (429, 5xx, network) are
/// retried with exponential backoff up to `max_retries` additional attempts.
/// Each brand authenticates with its own API key, so the key is passed per
/// call rather than held by the client.
pub struct ShortimizeClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    /// Base delay for backoff: `backoff_base_ms * 2^(attempt-1)` before jitter.
    backoff_base_ms: u64,
}

impl ShortimizeClient {
    /// Creates a client with configured base URL, timeout, `User-Agent`, and
    /// retry policy. `max_retries = 0` disables retries.
    ///
    /// # Errors
    ///
    /// Returns [`ShortimizeError::InvalidBaseUrl`] if `base_url` does not
    /// parse, or [`ShortimizeError::Http`] if the underlying client cannot be
    /// built.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ShortimizeError> {
        let base_url =
            Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
                ShortimizeError::InvalidBaseUrl {
                    base_url: base_url.to_owned(),
                    reason: e.to_string(),
                }
            })?;
        if base_url.cannot_be_a_base() {
            return Err(ShortimizeError::InvalidBaseUrl {
                base_url: base_url.to_string(),
                reason: "URL cannot be a base".to_owned(),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Fetches raw video records for one brand.
    ///
    /// `collection` restricts the request to one provider collection; `None`
    /// fetches the brand's most recently updated videos, for campaigns that
    /// rely on hashtags alone.
    ///
    /// # Errors
    ///
    /// - [`ShortimizeError::RateLimited`] or [`ShortimizeError::ServerError`]
    ///   after all retries are exhausted.
    /// - [`ShortimizeError::UnexpectedStatus`] for any other non-2xx status
    ///   (not retried; 401 means the brand's key was rejected).
    /// - [`ShortimizeError::Http`] on network failure after retries.
    /// - [`ShortimizeError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn fetch_videos(
        &self,
        api_key: &str,
        collection: Option<&str>,
        limit: u32,
    ) -> Result<Vec<ShortimizeVideo>, ShortimizeError> {
        let url = self.videos_url(collection, limit);

        let response = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url.clone())
                    .bearer_auth(api_key)
                    .send()
                    .await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ShortimizeError::RateLimited { retry_after_secs });
                }

                if status.is_server_error() {
                    return Err(ShortimizeError::ServerError {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                if !status.is_success() {
                    return Err(ShortimizeError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<ShortimizeVideosResponse>(&body).map_err(|e| {
                    ShortimizeError::Deserialize {
                        context: format!(
                            "videos for collection {}",
                            collection.unwrap_or("<none>")
                        ),
                        source: e,
                    }
                })
            }
        })
        .await?;

        let returned = response.data.len();
        if let Some(total) = response.pagination.and_then(|p| p.total) {
            if total > u64::try_from(returned).unwrap_or(u64::MAX) {
                tracing::warn!(
                    collection = collection.unwrap_or("<none>"),
                    total,
                    returned,
                    "Shortimize reports more videos than one request returns; extra videos are not synced"
                );
            }
        }
        tracing::debug!(
            collection = collection.unwrap_or("<none>"),
            returned,
            "fetched Shortimize videos"
        );

        Ok(response.data)
    }

    /// Fetches and normalizes video records for one brand.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_videos`].
    pub async fn fetch_collected_videos(
        &self,
        api_key: &str,
        collection: Option<&str>,
        limit: u32,
    ) -> Result<Vec<CollectedVideo>, ShortimizeError> {
        let raw = self.fetch_videos(api_key, collection, limit).await?;
        Ok(raw.into_iter().map(normalize_video).collect())
    }

    /// Builds `{base}/videos` with the fixed query parameters. The collection
    /// name is percent-encoded.
    fn videos_url(&self, collection: Option<&str>, limit: u32) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("videos");
        }
        {
            let mut query = url.query_pairs_mut();
            if let Some(name) = collection {
                query.append_pair("collections", name);
            }
            query
                .append_pair("limit", &limit.to_string())
                .append_pair("has_metrics", "true")
                .append_pair("order_by", "latest_updated_at")
                .append_pair("order_direction", "desc");
        }
        url
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
