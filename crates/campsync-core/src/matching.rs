//! Matching collected videos to creators' linked social accounts.
//!
//! The key is `lower(platform):lower(username)`. Lookup is exact on that
//! key; there is no fuzzy matching.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::video::CollectedVideo;

/// A creator's social account linked to a campaign with an active status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub platform: String,
    pub username: String,
}

/// Trim, drop one leading `@`, and lowercase a handle.
#[must_use]
pub fn normalize_username(username: &str) -> String {
    let trimmed = username.trim();
    trimmed
        .strip_prefix('@')
        .unwrap_or(trimmed)
        .to_lowercase()
}

/// Build the normalized `platform:username` lookup key.
#[must_use]
pub fn account_key(platform: &str, username: &str) -> String {
    format!(
        "{}:{}",
        platform.trim().to_lowercase(),
        normalize_username(username)
    )
}

/// Lookup table from normalized key to linked account.
#[derive(Debug, Default, Clone)]
pub struct AccountIndex {
    accounts: HashMap<String, LinkedAccount>,
}

impl AccountIndex {
    /// Build the index. When two accounts share a key, the last one wins.
    #[must_use]
    pub fn new(accounts: impl IntoIterator<Item = LinkedAccount>) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|a| (account_key(&a.platform, &a.username), a))
            .collect();
        Self { accounts }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    #[must_use]
    pub fn lookup(&self, video: &CollectedVideo) -> Option<&LinkedAccount> {
        self.accounts
            .get(&account_key(&video.platform, &video.username))
    }

    /// Partition `videos` into matched and unmatched sets.
    #[must_use]
    pub fn partition<'v>(&self, videos: &'v [CollectedVideo]) -> MatchOutcome<'v, '_> {
        let mut outcome = MatchOutcome::default();
        for video in videos {
            match self.lookup(video) {
                Some(account) => outcome.matched.push((video, account)),
                None => outcome.unmatched.push(video),
            }
        }
        outcome
    }
}

/// Result of [`AccountIndex::partition`].
#[derive(Debug, Default)]
pub struct MatchOutcome<'v, 'a> {
    pub matched: Vec<(&'v CollectedVideo, &'a LinkedAccount)>,
    pub unmatched: Vec<&'v CollectedVideo>,
}

impl MatchOutcome<'_, '_> {
    #[must_use]
    pub fn matched_count(&self) -> usize {
        self.matched.len()
    }

    #[must_use]
    pub fn unmatched_count(&self) -> usize {
        self.unmatched.len()
    }

    /// Distinct usernames (as reported by the provider) that matched, sorted.
    #[must_use]
    pub fn matched_usernames(&self) -> Vec<String> {
        self.matched
            .iter()
            .map(|(video, _)| video.username.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
