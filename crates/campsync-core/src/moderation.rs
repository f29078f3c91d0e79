//! Flag / clear / clawback state machine for payout items.
//!
//! ```text
//! unflagged --flag--> pending_review --clear----> cleared
//!                          |    ^
//!                    claim |    | settlement failed
//!                          v    |
//!                   clawback_in_progress --settled--> clawed_back
//! ```
//!
//! `cleared` and `clawed_back` are terminal; only one of them is reachable
//! for a given item. A clawback holds `clawback_in_progress` while the
//! settlement function runs, so a concurrent clear cannot land.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reason recorded when a reviewer claws back without typing one.
pub const DEFAULT_CLAWBACK_REASON: &str = "Flagged content violation";

/// Message sent to the creator when a flag is cleared.
pub const FLAG_CLEARED_MESSAGE: &str = "Good news! The flag on your video has been reviewed and cleared. Your payout will proceed as scheduled.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClawbackStatus {
    PendingReview,
    ClawbackInProgress,
    Cleared,
    ClawedBack,
}

impl ClawbackStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PendingReview => "pending_review",
            Self::ClawbackInProgress => "clawback_in_progress",
            Self::Cleared => "cleared",
            Self::ClawedBack => "clawed_back",
        }
    }

    /// Parse the stored column value. `None` means no decision yet.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw? {
            "pending_review" => Some(Self::PendingReview),
            "clawback_in_progress" => Some(Self::ClawbackInProgress),
            "cleared" => Some(Self::Cleared),
            "clawed_back" => Some(Self::ClawedBack),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cleared | Self::ClawedBack)
    }
}

impl std::fmt::Display for ClawbackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Flag,
    Clear,
    Clawback,
}

impl ModerationAction {
    /// The status an item ends up in after this action.
    #[must_use]
    pub fn target(self) -> ClawbackStatus {
        match self {
            Self::Flag => ClawbackStatus::PendingReview,
            Self::Clear => ClawbackStatus::Cleared,
            Self::Clawback => ClawbackStatus::ClawedBack,
        }
    }

    /// Whether this action is allowed for an item in the given state.
    ///
    /// `flagged` is whether `flagged_at` is set. An item that is flagged with
    /// a null status counts as pending review.
    #[must_use]
    pub fn allowed_from(self, flagged: bool, status: Option<ClawbackStatus>) -> bool {
        match self {
            Self::Flag => !flagged && status.is_none(),
            Self::Clear | Self::Clawback => {
                flagged && matches!(status, None | Some(ClawbackStatus::PendingReview))
            }
        }
    }
}

/// Whole days left before `clearing_ends_at`, never negative. Display only.
#[must_use]
pub fn days_remaining(clearing_ends_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (clearing_ends_at - now).num_days().max(0)
}

/// The reason sent with a clawback: trimmed input, or the default.
#[must_use]
pub fn clawback_reason(input: Option<&str>) -> String {
    input
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_CLAWBACK_REASON)
        .to_string()
}
