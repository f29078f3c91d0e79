//! Weekly view baseline for cached videos.
//!
//! A week starts at local midnight on the most recent Sunday. Each cache
//! entry remembers the week start it was baselined in and the view count at
//! that moment; the baseline resets at most once per calendar week.

use chrono::{Datelike, Local, NaiveDate};

/// The baseline fields stored on a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekBaseline {
    pub week_start_date: NaiveDate,
    pub week_start_views: i64,
}

/// What the cache writer should do with the baseline fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineDecision {
    /// Overwrite both fields with the new baseline.
    Reset(WeekBaseline),
    /// Leave the stored fields untouched.
    CarryForward,
}

/// The Sunday on or before `date`.
#[must_use]
pub fn week_start_for(date: NaiveDate) -> NaiveDate {
    let days_since_sunday = date.weekday().num_days_from_sunday();
    date - chrono::Duration::days(i64::from(days_since_sunday))
}

/// Week start for the current local date.
#[must_use]
pub fn current_week_start() -> NaiveDate {
    week_start_for(Local::now().date_naive())
}

/// Decide whether a cache entry's baseline resets.
///
/// `stored_week_start` is `None` when there is no prior entry or the entry
/// was never baselined; both reset.
#[must_use]
pub fn decide_baseline(
    stored_week_start: Option<NaiveDate>,
    current_week_start: NaiveDate,
    current_views: i64,
) -> BaselineDecision {
    match stored_week_start {
        Some(stored) if stored == current_week_start => BaselineDecision::CarryForward,
        _ => BaselineDecision::Reset(WeekBaseline {
            week_start_date: current_week_start,
            week_start_views: current_views,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn sunday_is_its_own_week_start() {
        // 2026-10-18 is a Sunday.
        assert_eq!(week_start_for(date(2026, 10, 18)), date(2026, 10, 18));
    }

    #[test]
    fn saturday_maps_back_to_previous_sunday() {
        assert_eq!(week_start_for(date(2026, 10, 24)), date(2026, 10, 18));
    }

    #[test]
    fn week_start_crosses_month_boundary() {
        // 2026-11-03 is a Tuesday; the week began 2026-11-01.
        assert_eq!(week_start_for(date(2026, 11, 3)), date(2026, 11, 1));
        // 2026-10-01 is a Thursday; the week began 2026-09-27.
        assert_eq!(week_start_for(date(2026, 10, 1)), date(2026, 9, 27));
    }

    #[test]
    fn current_week_start_is_a_sunday() {
        assert_eq!(current_week_start().weekday(), chrono::Weekday::Sun);
    }

    #[test]
    fn same_week_carries_baseline_forward() {
        let week = date(2026, 10, 18);
        assert_eq!(
            decide_baseline(Some(week), week, 5_000),
            BaselineDecision::CarryForward
        );
    }

    #[test]
    fn new_week_resets_baseline_to_current_views() {
        let decision = decide_baseline(Some(date(2026, 10, 11)), date(2026, 10, 18), 5_000);
        assert_eq!(
            decision,
            BaselineDecision::Reset(WeekBaseline {
                week_start_date: date(2026, 10, 18),
                week_start_views: 5_000,
            })
        );
    }

    #[test]
    fn missing_entry_resets_baseline() {
        let decision = decide_baseline(None, date(2026, 10, 18), 42);
        assert!(matches!(
            decision,
            BaselineDecision::Reset(WeekBaseline {
                week_start_views: 42,
                ..
            })
        ));
    }
}
