use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};

/// Hour of day (UTC) at which scheduled events kick off unless overridden.
const KICKOFF_HOUR: u32 = 19;

/// Immutable civil date. No timezone handling; all dates are nominal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SimDate(NaiveDate);

impl SimDate {
    pub fn new(year: i32, month: u32, day: u32) -> DomainResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(SimDate)
            .ok_or_else(|| {
                DomainError::ValidationError(format!(
                    "Invalid date: {:04}-{:02}-{:02}",
                    year, month, day
                ))
            })
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        SimDate(date)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    pub fn add_days(self, days: i64) -> Self {
        SimDate(self.0 + Duration::days(days))
    }

    pub fn days_until(&self, other: SimDate) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// The next Saturday on or after this date (identity when already Saturday).
    pub fn following_saturday(self) -> Self {
        let offset = (Weekday::Sat.num_days_from_monday() + 7
            - self.0.weekday().num_days_from_monday())
            % 7;
        self.add_days(offset as i64)
    }

    /// Compact `YYYYMMDD` form used inside game ids.
    pub fn compact(&self) -> String {
        format!("{:04}{:02}{:02}", self.year(), self.month(), self.day())
    }

    /// Millisecond timestamp of the default kickoff slot on this date.
    pub fn kickoff_timestamp_ms(&self) -> i64 {
        let dt = self.0.and_hms_opt(KICKOFF_HOUR, 0, 0).expect("valid time");
        Utc.from_utc_datetime(&dt).timestamp_millis()
    }

    /// Millisecond timestamp of midnight starting this date.
    pub fn start_of_day_ms(&self) -> i64 {
        let dt = self.0.and_hms_opt(0, 0, 0).expect("valid time");
        Utc.from_utc_datetime(&dt).timestamp_millis()
    }

    pub fn from_timestamp_ms(ms: i64) -> Self {
        let dt = Utc
            .timestamp_millis_opt(ms)
            .single()
            .unwrap_or_else(|| Utc.timestamp_millis_opt(0).unwrap());
        SimDate(dt.date_naive())
    }
}

impl std::fmt::Display for SimDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl std::str::FromStr for SimDate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(SimDate)
            .map_err(|_| DomainError::ValidationError(format!("Invalid date: {}", s)))
    }
}

/// The league year for season `N` runs from August 1 of year `N` to
/// August 1 of year `N + 1`; playoff games of season `N` land in January
/// of `N + 1` and still belong to that window.
pub fn league_year_window(season: i32) -> (SimDate, SimDate) {
    let start = SimDate::new(season, 8, 1).expect("valid league year start");
    let end = SimDate::new(season + 1, 8, 1).expect("valid league year end");
    (start, end)
}

/// Monotonic time cursor over civil dates.
#[derive(Debug, Clone)]
pub struct Calendar {
    current: SimDate,
}

impl Calendar {
    pub fn new(start: SimDate) -> Self {
        Self { current: start }
    }

    pub fn current_date(&self) -> SimDate {
        self.current
    }

    /// Advances the cursor by `days` atomically and returns the new date.
    pub fn advance(&mut self, days: u32) -> SimDate {
        self.current = self.current.add_days(days as i64);
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_display() {
        let date = SimDate::new(2025, 9, 5).unwrap();
        assert_eq!(date.to_string(), "2025-09-05");
        assert_eq!(date.compact(), "20250905");
        assert!(SimDate::new(2025, 2, 30).is_err());
    }

    #[test]
    fn test_parse_round_trip() {
        let date: SimDate = "2025-09-05".parse().unwrap();
        assert_eq!(date, SimDate::new(2025, 9, 5).unwrap());
        assert!("not-a-date".parse::<SimDate>().is_err());
    }

    #[test]
    fn test_add_days_and_ordering() {
        let date = SimDate::new(2025, 12, 30).unwrap();
        let later = date.add_days(3);
        assert_eq!(later, SimDate::new(2026, 1, 2).unwrap());
        assert!(date < later);
        assert_eq!(date.days_until(later), 3);
    }

    #[test]
    fn test_following_saturday() {
        // 2026-01-18 is a Sunday; the following Saturday is the 24th.
        let sunday = SimDate::new(2026, 1, 18).unwrap();
        assert_eq!(sunday.following_saturday(), SimDate::new(2026, 1, 24).unwrap());

        // A Saturday maps to itself.
        let saturday = SimDate::new(2026, 1, 24).unwrap();
        assert_eq!(saturday.following_saturday(), saturday);
    }

    #[test]
    fn test_kickoff_timestamp_round_trip() {
        let date = SimDate::new(2025, 9, 5).unwrap();
        let ms = date.kickoff_timestamp_ms();
        assert_eq!(SimDate::from_timestamp_ms(ms), date);
        assert!(ms > date.start_of_day_ms());
        assert!(ms < date.add_days(1).start_of_day_ms());
    }

    #[test]
    fn test_calendar_advance() {
        let mut calendar = Calendar::new(SimDate::new(2025, 9, 5).unwrap());
        assert_eq!(calendar.current_date().to_string(), "2025-09-05");
        calendar.advance(1);
        assert_eq!(calendar.current_date().to_string(), "2025-09-06");
        calendar.advance(7);
        assert_eq!(calendar.current_date().to_string(), "2025-09-13");
    }

    #[test]
    fn test_league_year_window() {
        let (start, end) = league_year_window(2025);
        assert_eq!(start.to_string(), "2025-08-01");
        assert_eq!(end.to_string(), "2026-08-01");
        // A January playoff date belongs to the prior season's window.
        let divisional = SimDate::new(2026, 1, 17).unwrap();
        assert!(divisional >= start && divisional < end);
    }
}
