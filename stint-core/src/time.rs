//! Time utilities: local wall-clock time-of-day arithmetic.
//!
//! A schedule lives inside a single calendar day, so every boundary is a
//! minute offset from local midnight. Timestamps (`NaiveDateTime`) only show up
//! where the caller's clock meets the schedule: completion and reminders.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// Minutes in a day; also the largest representable time ("24:00").
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Minute-resolution time of day, `00:00 ..= 24:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(MINUTES_PER_DAY);

    pub fn from_minutes(minutes: u32) -> Result<Self> {
        if minutes > MINUTES_PER_DAY {
            return Err(ScheduleError::InvalidTime(format!("{minutes} minutes")));
        }
        Ok(Self(minutes))
    }

    pub fn from_hm(hour: u32, minute: u32) -> Result<Self> {
        if minute >= 60 {
            return Err(ScheduleError::InvalidTime(format!("{hour}:{minute}")));
        }
        Self::from_minutes(hour * 60 + minute)
    }

    /// Parse "HH:MM". "24:00" is accepted as the end of the day.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "24:00" {
            return Ok(Self::END_OF_DAY);
        }
        let t = NaiveTime::parse_from_str(s, "%H:%M")
            .map_err(|_| ScheduleError::InvalidTime(s.to_string()))?;
        Ok(Self(t.hour() * 60 + t.minute()))
    }

    /// Truncates seconds.
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Self(dt.hour() * 60 + dt.minute())
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn hour(self) -> u32 {
        self.0 / 60
    }

    pub fn minute(self) -> u32 {
        self.0 % 60
    }

    /// Saturates at 24:00.
    pub fn add_minutes(self, minutes: u32) -> Self {
        Self(self.0.saturating_add(minutes).min(MINUTES_PER_DAY))
    }

    /// Saturates at 00:00.
    pub fn sub_minutes(self, minutes: u32) -> Self {
        Self(self.0.saturating_sub(minutes))
    }

    /// Signed distance to `later`; negative when `later` is earlier.
    pub fn minutes_until(self, later: TimeOfDay) -> i64 {
        i64::from(later.0) - i64::from(self.0)
    }

    /// Anchor this time of day on a calendar date.
    pub fn on(self, date: NaiveDate) -> NaiveDateTime {
        let midnight = date.and_time(NaiveTime::MIN);
        midnight + chrono::Duration::minutes(i64::from(self.0))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ScheduleError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

/// The `[start, end]` span a schedule may occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl Window {
    /// Zero-width windows are allowed; they just schedule nothing.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self> {
        if start > end {
            return Err(ScheduleError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(TimeOfDay::parse(start)?, TimeOfDay::parse(end)?)
    }

    pub fn length_minutes(&self) -> u32 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }

    /// Inclusive on both ends.
    pub fn contains(&self, t: TimeOfDay) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Whole minutes from `from` to `to`, rounded to the nearest minute.
pub fn round_minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let millis = (to - from).num_milliseconds();
    (millis as f64 / 60_000.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    #[test]
    fn parses_and_formats_hh_mm() {
        assert_eq!(t("09:05").minutes(), 545);
        assert_eq!(t("09:05").to_string(), "09:05");
        assert_eq!(t("24:00"), TimeOfDay::END_OF_DAY);
        assert!(TimeOfDay::parse("25:00").is_err());
        assert!(TimeOfDay::parse("nine").is_err());
    }

    #[test]
    fn arithmetic_saturates_at_day_bounds() {
        assert_eq!(t("23:50").add_minutes(30), TimeOfDay::END_OF_DAY);
        assert_eq!(t("00:10").sub_minutes(30), TimeOfDay::MIDNIGHT);
        assert_eq!(t("09:00").minutes_until(t("08:30")), -30);
    }

    #[test]
    fn anchors_on_a_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let dt = t("13:45").on(date);
        assert_eq!(dt.to_string(), "2026-03-02 13:45:00");
        assert_eq!(TimeOfDay::from_datetime(dt), t("13:45"));
    }

    #[test]
    fn window_rejects_inverted_bounds() {
        assert!(Window::parse("10:00", "09:00").is_err());
        let w = Window::parse("09:00", "09:00").unwrap();
        assert_eq!(w.length_minutes(), 0);
        assert!(w.contains(t("09:00")));
    }

    #[test]
    fn serde_uses_hh_mm_strings() {
        let json = serde_json::to_string(&t("07:30")).unwrap();
        assert_eq!(json, "\"07:30\"");
        let back: TimeOfDay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t("07:30"));
        assert!(serde_json::from_str::<TimeOfDay>("\"7h\"").is_err());
    }

    #[test]
    fn rounds_elapsed_minutes() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let start = t("09:00").on(date);
        assert_eq!(round_minutes_between(start, start + chrono::Duration::seconds(89)), 1);
        assert_eq!(round_minutes_between(start, start + chrono::Duration::seconds(90)), 2);
        assert_eq!(round_minutes_between(start, start - chrono::Duration::minutes(5)), -5);
    }
}
