//! Built-in calendars and their enumeration functions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{CalendarError, Result};

/// Days of the month in a 365-day year, January through December.
const DAYS_IN_MONTHS_365: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Days of the month in a 366-day year, January through December.
const DAYS_IN_MONTHS_366: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Days of the month for a 360-day calendar.
///
/// `month` and `year` are accepted for signature uniformity with the other
/// day-set functions and are not consulted.
pub fn days_in_month_360(_month: u32, _year: i64) -> Vec<u32> {
    (1..=30).collect()
}

/// Days of the month for a 365-day (no leap) calendar.
///
/// `month` must be in `1..=12`.
pub fn days_in_month_365(month: u32, _year: i64) -> Vec<u32> {
    (1..=DAYS_IN_MONTHS_365[(month - 1) as usize]).collect()
}

/// Days of the month for a 366-day (all leap) calendar.
///
/// `month` must be in `1..=12`.
pub fn days_in_month_366(month: u32, _year: i64) -> Vec<u32> {
    (1..=DAYS_IN_MONTHS_366[(month - 1) as usize]).collect()
}

/// Days of the month for the Julian calendar: leap year every 4 years,
/// no century exception.
pub fn days_in_month_julian(month: u32, year: i64) -> Vec<u32> {
    if year % 4 == 0 {
        days_in_month_366(month, year)
    } else {
        days_in_month_365(month, year)
    }
}

/// Days of the month for the proleptic Gregorian calendar: leap year every
/// 4 years, except every 100 years, but still every 400 years.
pub fn days_in_month_proleptic_gregorian(month: u32, year: i64) -> Vec<u32> {
    if (year % 100 == 0) && (year % 400 != 0) {
        days_in_month_365(month, year)
    } else {
        days_in_month_julian(month, year)
    }
}

/// Days of the month for the historical Gregorian calendar.
///
/// Proleptic Gregorian after the 1582 cutover, Julian before it. October 5
/// to October 14 of 1582 do not exist.
pub fn days_in_month_gregorian(month: u32, year: i64) -> Vec<u32> {
    if (year > 1582) || (year == 1582 && month > 10) {
        days_in_month_proleptic_gregorian(month, year)
    } else if year == 1582 && month == 10 {
        let mut days: Vec<u32> = (1..=4).collect();
        days.extend(15..=31);
        days
    } else {
        days_in_month_julian(month, year)
    }
}

/// The year subdivision scheme of a built-in calendar.
///
/// Closed set: every site that dispatches on the scheme matches exhaustively,
/// so an unrecognized calendar can only fail at construction
/// ([`calendar_from_alias`]), never silently downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalendarKind {
    /// 12 months of 30 days each.
    Days360,
    /// 365 days every year.
    NoLeap,
    /// 366 days every year.
    AllLeap,
    /// Leap year every 4 years.
    Julian,
    /// Gregorian leap rule applied to all years.
    ProlepticGregorian,
    /// Julian before 1582, Gregorian after, with the October 1582 gap.
    Gregorian,
    /// Years with a single dummy cycle and day.
    YearsOnly,
    /// Months with a single dummy day each.
    MonthsOnly,
    /// Four temperate seasons with a single dummy day each.
    Seasons,
    /// 365 days per year with no month subdivision.
    Days365NoMonths,
}

/// An immutable calendar definition.
///
/// The alias is the sole identity key: two calendars with equal alias compare
/// equal regardless of anything else, mirroring how the CF `calendar`
/// attribute is the only identity carried by data files. Calendars
/// serialize as their alias string.
#[derive(Debug, Clone, Copy)]
pub struct Calendar {
    alias: &'static str,
    kind: CalendarKind,
}

impl Serialize for Calendar {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.alias)
    }
}

impl<'de> Deserialize<'de> for Calendar {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let alias = String::deserialize(deserializer)?;
        calendar_from_alias(&alias).map_err(serde::de::Error::custom)
    }
}

impl PartialEq for Calendar {
    fn eq(&self, other: &Self) -> bool {
        self.alias == other.alias
    }
}

impl Eq for Calendar {}

impl Hash for Calendar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.alias.hash(state);
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias)
    }
}

impl Calendar {
    /// 360-day calendar with Gregorian month names.
    pub const DAYS_360: Calendar = Calendar {
        alias: "360_day",
        kind: CalendarKind::Days360,
    };
    /// 365-day calendar, never a leap year.
    pub const NO_LEAP: Calendar = Calendar {
        alias: "noleap",
        kind: CalendarKind::NoLeap,
    };
    /// 366-day calendar, every year a leap year.
    pub const ALL_LEAP: Calendar = Calendar {
        alias: "all_leap",
        kind: CalendarKind::AllLeap,
    };
    /// Julian calendar.
    pub const JULIAN: Calendar = Calendar {
        alias: "julian",
        kind: CalendarKind::Julian,
    };
    /// Proleptic Gregorian calendar.
    pub const PROLEPTIC_GREGORIAN: Calendar = Calendar {
        alias: "proleptic_gregorian",
        kind: CalendarKind::ProlepticGregorian,
    };
    /// Historical Gregorian calendar with the 1582 cutover.
    pub const GREGORIAN: Calendar = Calendar {
        alias: "gregorian",
        kind: CalendarKind::Gregorian,
    };
    /// Years with no sub-year structure.
    pub const YEARS_ONLY: Calendar = Calendar {
        alias: "years_only",
        kind: CalendarKind::YearsOnly,
    };
    /// Months only, no day structure.
    pub const MONTHS_ONLY: Calendar = Calendar {
        alias: "months_only",
        kind: CalendarKind::MonthsOnly,
    };
    /// Temperate seasons only.
    pub const SEASONS: Calendar = Calendar {
        alias: "seasons",
        kind: CalendarKind::Seasons,
    };
    /// 365 days per year, no months.
    pub const DAYS_365_NO_MONTHS: Calendar = Calendar {
        alias: "365_days_no_months",
        kind: CalendarKind::Days365NoMonths,
    };

    /// The unique name of this calendar.
    pub fn alias(&self) -> &'static str {
        self.alias
    }

    /// The subdivision scheme of this calendar.
    pub fn kind(&self) -> CalendarKind {
        self.kind
    }

    /// Ordered cycles (months, seasons, or a single dummy cycle) of a year.
    pub fn cycles_in_year(&self, _year: i64) -> Vec<u32> {
        match self.kind {
            CalendarKind::YearsOnly | CalendarKind::Days365NoMonths => vec![0],
            CalendarKind::Seasons => (1..=4).collect(),
            CalendarKind::Days360
            | CalendarKind::NoLeap
            | CalendarKind::AllLeap
            | CalendarKind::Julian
            | CalendarKind::ProlepticGregorian
            | CalendarKind::Gregorian
            | CalendarKind::MonthsOnly => (1..=12).collect(),
        }
    }

    /// Ordered days of one cycle of a year.
    ///
    /// For month-based calendars `cycle` must be in `1..=12`.
    pub fn days_in_cycle(&self, cycle: u32, year: i64) -> Vec<u32> {
        match self.kind {
            CalendarKind::Days360 => days_in_month_360(cycle, year),
            CalendarKind::NoLeap => days_in_month_365(cycle, year),
            CalendarKind::AllLeap => days_in_month_366(cycle, year),
            CalendarKind::Julian => days_in_month_julian(cycle, year),
            CalendarKind::ProlepticGregorian => days_in_month_proleptic_gregorian(cycle, year),
            CalendarKind::Gregorian => days_in_month_gregorian(cycle, year),
            CalendarKind::YearsOnly | CalendarKind::MonthsOnly | CalendarKind::Seasons => vec![1],
            CalendarKind::Days365NoMonths => (1..=365).collect(),
        }
    }

    /// Check whether a year is a leap year.
    ///
    /// By convention a year is leap when the last day enumerated for cycle 2
    /// (the February equivalent) is the 29th. Calendars without a leap
    /// concept fail with [`CalendarError::NoLeapConcept`].
    pub fn is_leap(&self, year: i64) -> Result<bool> {
        match self.kind {
            CalendarKind::MonthsOnly | CalendarKind::Seasons | CalendarKind::Days365NoMonths => {
                Err(CalendarError::NoLeapConcept(self.alias))
            }
            _ => Ok(self.days_in_cycle(2, year).last() == Some(&29)),
        }
    }

    /// Number of cycles in a year.
    pub fn count_cycles_in_year(&self, year: i64) -> usize {
        self.cycles_in_year(year).len()
    }

    /// Number of days in one cycle of a year.
    pub fn count_days_in_cycle(&self, cycle: u32, year: i64) -> usize {
        self.days_in_cycle(cycle, year).len()
    }

    /// Number of days in a year, summed over all its cycles.
    pub fn count_days_in_year(&self, year: i64) -> u64 {
        self.cycles_in_year(year)
            .iter()
            .map(|&cycle| self.days_in_cycle(cycle, year).len() as u64)
            .sum()
    }
}

/// Get a built-in calendar from its alias.
///
/// This is mostly a mapping from the calendar names of the CF Conventions to
/// the built-in calendars; synonyms (`standard`, `365_day`, `366_day`)
/// resolve to the same calendar value.
pub fn calendar_from_alias(alias: &str) -> Result<Calendar> {
    match alias {
        "360_day" => Ok(Calendar::DAYS_360),
        "noleap" | "365_day" => Ok(Calendar::NO_LEAP),
        "all_leap" | "366_day" => Ok(Calendar::ALL_LEAP),
        "julian" => Ok(Calendar::JULIAN),
        "proleptic_gregorian" => Ok(Calendar::PROLEPTIC_GREGORIAN),
        "gregorian" | "standard" => Ok(Calendar::GREGORIAN),
        "years_only" => Ok(Calendar::YEARS_ONLY),
        "months_only" => Ok(Calendar::MONTHS_ONLY),
        "seasons" => Ok(Calendar::SEASONS),
        "365_days_no_months" => Ok(Calendar::DAYS_365_NO_MONTHS),
        other => Err(CalendarError::UnknownCalendar(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_is_by_alias() {
        assert_eq!(Calendar::NO_LEAP, calendar_from_alias("365_day").unwrap());
        assert_ne!(Calendar::NO_LEAP, Calendar::ALL_LEAP);
    }

    #[test]
    fn test_gregorian_october_1582() {
        let days = days_in_month_gregorian(10, 1582);
        let expected: Vec<u32> = vec![
            1, 2, 3, 4, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31,
        ];
        assert_eq!(days, expected);
        assert_eq!(days.len(), 21);
    }

    #[test]
    fn test_gregorian_cutover_delegation() {
        // 1582-11 and later: proleptic rule. 1582-09 and earlier: Julian.
        assert_eq!(days_in_month_gregorian(11, 1582).len(), 30);
        assert_eq!(days_in_month_gregorian(2, 1500).len(), 29); // Julian leap
        assert_eq!(days_in_month_gregorian(2, 1900).len(), 28); // century, not leap
    }

    #[test]
    fn test_unknown_alias() {
        assert!(matches!(
            calendar_from_alias("lunar"),
            Err(CalendarError::UnknownCalendar(_))
        ));
    }

    #[test]
    fn test_leap_concept_missing() {
        for cal in [
            Calendar::MONTHS_ONLY,
            Calendar::SEASONS,
            Calendar::DAYS_365_NO_MONTHS,
        ] {
            assert!(matches!(
                cal.is_leap(2000),
                Err(CalendarError::NoLeapConcept(_))
            ));
        }
    }
}
