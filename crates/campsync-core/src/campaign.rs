use serde::{Deserialize, Serialize};

/// What the collector should fetch for a campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionScope {
    /// Fetch one provider collection, optionally narrowed by hashtags.
    Collection {
        name: String,
        hashtags: Vec<String>,
    },
    /// No collection: fetch recent videos and rely on hashtags alone.
    HashtagsOnly { hashtags: Vec<String> },
}

impl CollectionScope {
    /// Resolve a campaign's effective scope.
    ///
    /// The campaign's own collection wins over the brand default. Returns
    /// `None` when there is neither a collection nor a non-blank hashtag, in
    /// which case the campaign is not eligible for collection.
    #[must_use]
    pub fn resolve(
        campaign_collection: Option<&str>,
        brand_collection: Option<&str>,
        hashtags: &[String],
    ) -> Option<Self> {
        let collection = [campaign_collection, brand_collection]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|c| !c.is_empty());

        let hashtags: Vec<String> = hashtags
            .iter()
            .filter(|t| !crate::hashtags::normalize_hashtag(t).is_empty())
            .cloned()
            .collect();

        match collection {
            Some(name) => Some(Self::Collection {
                name: name.to_string(),
                hashtags,
            }),
            None if !hashtags.is_empty() => Some(Self::HashtagsOnly { hashtags }),
            None => None,
        }
    }

    #[must_use]
    pub fn collection_name(&self) -> Option<&str> {
        match self {
            Self::Collection { name, .. } => Some(name),
            Self::HashtagsOnly { .. } => None,
        }
    }

    #[must_use]
    pub fn hashtags(&self) -> &[String] {
        match self {
            Self::Collection { hashtags, .. } | Self::HashtagsOnly { hashtags } => hashtags,
        }
    }
}

/// What a submission or metrics snapshot is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Campaign,
    Boost,
}

impl SourceType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Campaign => "campaign",
            Self::Boost => "boost",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
