//! CF time units ("days since 1850-01-01") and calendar-agnostic timestamps.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimeIndexError};

/// The counting unit of a CF time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Length of one unit in seconds.
    pub fn seconds(&self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Minutes => 60.0,
            TimeUnit::Hours => 3600.0,
            TimeUnit::Days => 86400.0,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = TimeIndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "second" | "seconds" | "sec" | "secs" => Ok(TimeUnit::Seconds),
            "minute" | "minutes" | "min" | "mins" => Ok(TimeUnit::Minutes),
            "hour" | "hours" | "hr" | "hrs" => Ok(TimeUnit::Hours),
            "day" | "days" => Ok(TimeUnit::Days),
            other => Err(TimeIndexError::BadUnits(other.to_string())),
        }
    }
}

/// A timestamp that may only exist in a non-Gregorian calendar.
///
/// Plain fields, no timezone: CF time axes carry none, and dates like
/// February 30 (`360_day`) cannot be represented by real datetime types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalDateTime {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl CalDateTime {
    pub fn new(year: i64, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// A date-only timestamp; the time of day defaults to noon, matching how
    /// daily data is usually stamped.
    pub fn ymd(year: i64, month: u32, day: u32) -> Self {
        Self::new(year, month, day, 12, 0, 0)
    }

    /// Seconds elapsed since this timestamp's midnight.
    pub fn seconds_of_day(&self) -> f64 {
        f64::from(self.hour) * 3600.0 + f64::from(self.minute) * 60.0 + f64::from(self.second)
    }

    /// Parse an ISO-like timestamp, defaulting the time of day to noon when
    /// only a date is given.
    ///
    /// Tries the real-calendar parser first; dates that only exist in
    /// alternate CF calendars fall back to plain field splitting (strptime
    /// cannot represent them).
    pub fn parse_timestamp(s: &str) -> Result<Self> {
        Self::parse_with_default(s, (12, 0, 0))
    }

    fn parse_with_default(s: &str, default_hms: (u32, u32, u32)) -> Result<Self> {
        let s = s.trim().trim_end_matches('Z');

        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
            return Ok(Self::from_naive(dt));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(Self::from_naive(dt));
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            let (hour, minute, second) = default_hms;
            return Ok(Self::new(
                i64::from(d.year()),
                d.month(),
                d.day(),
                hour,
                minute,
                second,
            ));
        }

        let (date_part, time_part) = match s.split_once(['T', ' ']) {
            Some((d, t)) => (d, Some(t)),
            None => (s, None),
        };
        // rsplitn copes with negative years: "-4713-01-01".
        let mut date_fields = date_part.rsplitn(3, '-');
        let day = date_fields.next();
        let month = date_fields.next();
        let year = date_fields.next();
        let (year, month, day) = match (year, month, day) {
            (Some(y), Some(m), Some(d)) if !y.is_empty() => (y, m, d),
            _ => return Err(TimeIndexError::BadTimestamp(s.to_string())),
        };
        let parse_u32 =
            |v: &str| -> Result<u32> { v.parse().map_err(|_| TimeIndexError::BadTimestamp(s.to_string())) };
        let year: i64 = year
            .parse()
            .map_err(|_| TimeIndexError::BadTimestamp(s.to_string()))?;
        let month = parse_u32(month)?;
        let day = parse_u32(day)?;
        let (hour, minute, second) = match time_part {
            Some(t) => {
                let mut hms = t.splitn(3, ':');
                let hour = parse_u32(hms.next().unwrap_or_default())?;
                let minute = parse_u32(hms.next().unwrap_or("0"))?;
                let second = parse_u32(hms.next().unwrap_or("0"))?;
                (hour, minute, second)
            }
            None => default_hms,
        };
        Ok(Self::new(year, month, day, hour, minute, second))
    }

    fn from_naive(dt: NaiveDateTime) -> Self {
        Self::new(
            i64::from(dt.year()),
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minute(),
            dt.second(),
        )
    }
}

impl fmt::Display for CalDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// A parsed CF units string: counting unit plus reference timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeUnits {
    pub unit: TimeUnit,
    pub origin: CalDateTime,
}

impl FromStr for TimeUnits {
    type Err = TimeIndexError;

    /// Parse `<unit> since <timestamp>`. The origin's time of day defaults
    /// to midnight when only a date is given.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let unit: TimeUnit = parts
            .next()
            .ok_or_else(|| TimeIndexError::BadUnits(s.to_string()))?
            .parse()?;
        match parts.next() {
            Some(word) if word.eq_ignore_ascii_case("since") => {}
            _ => return Err(TimeIndexError::BadUnits(s.to_string())),
        }
        let rest: Vec<&str> = parts.collect();
        if rest.is_empty() {
            return Err(TimeIndexError::BadUnits(s.to_string()));
        }
        let origin = CalDateTime::parse_with_default(&rest.join(" "), (0, 0, 0))?;
        Ok(TimeUnits { unit, origin })
    }
}

impl fmt::Display for TimeUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
        };
        write!(f, "{} since {}", unit, self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_days_since() {
        let units: TimeUnits = "days since 1850-01-01".parse().unwrap();
        assert_eq!(units.unit, TimeUnit::Days);
        assert_eq!(units.origin, CalDateTime::new(1850, 1, 1, 0, 0, 0));
    }

    #[test]
    fn parse_hours_since_with_time() {
        let units: TimeUnits = "hours since 2001-06-15 06:30:00".parse().unwrap();
        assert_eq!(units.unit, TimeUnit::Hours);
        assert_eq!(units.origin, CalDateTime::new(2001, 6, 15, 6, 30, 0));
    }

    #[test]
    fn parse_garbage_units_fails() {
        assert!("fortnights since 1850-01-01".parse::<TimeUnits>().is_err());
        assert!("days after 1850-01-01".parse::<TimeUnits>().is_err());
        assert!("days since".parse::<TimeUnits>().is_err());
    }

    #[test]
    fn timestamp_defaults_to_noon() {
        let t = CalDateTime::parse_timestamp("1999-03-07").unwrap();
        assert_eq!(t, CalDateTime::new(1999, 3, 7, 12, 0, 0));
    }

    #[test]
    fn timestamp_full_datetime() {
        let t = CalDateTime::parse_timestamp("1999-03-07T18:45:12").unwrap();
        assert_eq!(t, CalDateTime::new(1999, 3, 7, 18, 45, 12));
    }

    #[test]
    fn timestamp_in_alternate_calendar_only() {
        // February 30 exists in the 360_day calendar but not for chrono.
        let t = CalDateTime::parse_timestamp("2005-02-30").unwrap();
        assert_eq!(t, CalDateTime::new(2005, 2, 30, 12, 0, 0));
        let t = CalDateTime::parse_timestamp("2005-02-30T06:00:00").unwrap();
        assert_eq!(t.hour, 6);
    }

    #[test]
    fn timestamp_negative_year() {
        let t = CalDateTime::parse_timestamp("-0100-01-01").unwrap();
        assert_eq!(t.year, -100);
    }

    #[test]
    fn timestamp_garbage_fails() {
        assert!(CalDateTime::parse_timestamp("not a date").is_err());
        assert!(CalDateTime::parse_timestamp("2005").is_err());
    }
}
