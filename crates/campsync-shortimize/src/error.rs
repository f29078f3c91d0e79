use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShortimizeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by Shortimize (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("Shortimize server error {status} from {url}")]
    ServerError { status: u16, url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid Shortimize base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl ShortimizeError {
    /// HTTP status carried by the error, if the provider answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::ServerError { status, .. } | Self::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Deserialize { .. } | Self::InvalidBaseUrl { .. } => None,
        }
    }
}
