//! Day-granular availability checks.
//!
//! # Purpose
//! Pure helpers that decide whether a car is free on every day of a requested
//! range. All comparisons are on calendar days; time-of-day never matters.
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;

/// Parse `YYYY-MM-DD` or an RFC 3339 timestamp into a calendar day.
///
/// Timestamps are normalized to their UTC day.
pub fn parse_day(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(input)
            .ok()
            .map(|timestamp| timestamp.with_timezone(&Utc).date_naive())
    })
}

/// Inclusive sequence of days from `start` to `end`.
///
/// Empty when `start > end`.
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day <= end).collect()
}

/// True iff every requested day appears in `available`.
///
/// An empty request is trivially satisfied.
pub fn all_dates_available(available: &[NaiveDate], requested: &[NaiveDate]) -> bool {
    let days: HashSet<&NaiveDate> = available.iter().collect();
    requested.iter().all(|day| days.contains(day))
}

/// Whether a car with `available` days is free on every day from `start` to
/// `end` inclusive.
///
/// A range longer than the number of available days cannot be covered, so it
/// is rejected before the range is materialized.
pub fn available_between(available: &[NaiveDate], start: NaiveDate, end: NaiveDate) -> bool {
    let span = end.signed_duration_since(start).num_days() + 1;
    if span > available.len() as i64 {
        return false;
    }
    all_dates_available(available, &dates_between(start, end))
}
