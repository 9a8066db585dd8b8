//! Absolute time windows for the Data API search calls.
//!
//! A window is derived once per run from the target calendar date and the
//! category's optional `hours_back` override, then rendered into the
//! 'Z'-suffixed ISO-8601 strings the search endpoint expects.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};

/// Half-open `[start, end)` range of instants, always `start < end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Computes the window for `target_date`.
    ///
    /// The end is `now` when the target date is today, otherwise the last
    /// instant of that day in UTC. With `hours_back` the start is exactly
    /// that many hours before the end; without it the start is midnight of
    /// the target date.
    ///
    /// `now` is passed in rather than read from the clock so callers and
    /// tests agree on what "today" means.
    pub fn resolve(target_date: NaiveDate, hours_back: Option<i64>, now: DateTime<Utc>) -> Self {
        let end = if target_date == now.date_naive() {
            now
        } else {
            end_of_day(target_date)
        };

        let start = match hours_back {
            Some(hours) => end - Duration::hours(hours),
            None => target_date
                .and_hms_opt(0, 0, 0)
                .expect("midnight is a valid time")
                .and_utc(),
        };

        Self { start, end }
    }

    /// Lower bound in the wire format (`publishedAfter`).
    pub fn published_after(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Upper bound in the wire format (`publishedBefore`).
    pub fn published_before(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_micro_opt(23, 59, 59, 999_999)
        .expect("end of day is a valid time")
        .and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn full_day_window_for_past_date() {
        let now = at(2024, 5, 20, 15, 0, 0);
        let day = NaiveDate::from_ymd_opt(2024, 5, 18).unwrap();
        let window = TimeWindow::resolve(day, None, now);

        assert_eq!(window.start, at(2024, 5, 18, 0, 0, 0));
        assert_eq!(window.published_after(), "2024-05-18T00:00:00Z");
        assert_eq!(window.published_before(), "2024-05-18T23:59:59Z");
        assert!(window.start < window.end);
    }

    #[test]
    fn today_window_ends_now() {
        let now = at(2024, 5, 20, 15, 30, 0);
        let today = now.date_naive();
        let window = TimeWindow::resolve(today, None, now);

        assert_eq!(window.end, now);
        assert_eq!(window.start, at(2024, 5, 20, 0, 0, 0));
    }

    #[test]
    fn hours_back_is_exact() {
        let now = at(2024, 5, 20, 15, 30, 0);
        let today = now.date_naive();
        let window = TimeWindow::resolve(today, Some(7), now);

        assert_eq!(window.end, now);
        assert_eq!(window.end - window.start, Duration::hours(7));
    }

    #[test]
    fn hours_back_on_past_date_counts_from_end_of_day() {
        let now = at(2024, 5, 20, 15, 30, 0);
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let window = TimeWindow::resolve(day, Some(24), now);

        assert_eq!(window.end - window.start, Duration::hours(24));
        assert_eq!(window.published_before(), "2024-05-01T23:59:59Z");
        assert_eq!(window.published_after(), "2024-04-30T23:59:59Z");
    }
}
