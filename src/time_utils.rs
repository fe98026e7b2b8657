// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and the calendar-day clock.
//!
//! Progress documents are partitioned by the caller's *local* calendar day.
//! No time zone normalization happens here, so "today" can disagree with a
//! server clock near midnight.

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};

/// Format used for calendar date keys (`YYYY-MM-DD`).
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a calendar date as a `YYYY-MM-DD` key.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` key back into a calendar date.
pub fn parse_date_key(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_KEY_FORMAT).ok()
}

/// The calendar day before `date`. Handles month and year rollover.
pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(NaiveDate::MIN)
}

/// Source of "today" for date-keyed reads and writes.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    fn yesterday(&self) -> NaiveDate {
        previous_day(self.today())
    }

    fn now_utc(&self) -> DateTime<Utc>;
}

/// Reads the local wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one calendar day (tests).
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn ymd(year: i32, month: u32, day: u32) -> Self {
        Self::new(NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.today
            .and_hms_opt(12, 0, 0)
            .unwrap_or_default()
            .and_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_key_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(date_key(date), "2024-03-07");
    }

    #[test]
    fn test_parse_date_key_rejects_garbage() {
        assert!(parse_date_key("2024-13-01").is_none());
        assert!(parse_date_key("yesterday").is_none());
        assert_eq!(
            parse_date_key("2024-02-29"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
    }

    #[test]
    fn test_yesterday_rolls_over_year() {
        let clock = FixedClock::ymd(2025, 1, 1);
        assert_eq!(date_key(clock.yesterday()), "2024-12-31");
    }

    #[test]
    fn test_yesterday_rolls_over_month_in_leap_year() {
        let clock = FixedClock::ymd(2024, 3, 1);
        assert_eq!(date_key(clock.yesterday()), "2024-02-29");
    }

    #[test]
    fn test_format_utc_rfc3339() {
        let clock = FixedClock::ymd(2024, 1, 15);
        assert_eq!(format_utc_rfc3339(clock.now_utc()), "2024-01-15T12:00:00Z");
    }
}
