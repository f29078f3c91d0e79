use serde::Serialize;

use crate::video::VideoMetrics;

/// Aggregate totals over a set of submissions, as stored in a metrics snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricTotals {
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub bookmarks: i64,
    pub videos: i64,
}

impl MetricTotals {
    /// Sum `items`. Returns `None` for an empty set, which callers treat as
    /// "nothing to snapshot".
    #[must_use]
    pub fn aggregate<'a>(items: impl IntoIterator<Item = &'a VideoMetrics>) -> Option<Self> {
        let mut totals = Self::default();
        for m in items {
            totals.views = totals.views.saturating_add(m.views);
            totals.likes = totals.likes.saturating_add(m.likes);
            totals.comments = totals.comments.saturating_add(m.comments);
            totals.shares = totals.shares.saturating_add(m.shares);
            totals.bookmarks = totals.bookmarks.saturating_add(m.bookmarks);
            totals.videos += 1;
        }
        (totals.videos > 0).then_some(totals)
    }
}
