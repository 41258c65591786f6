//! Time axis value object and CF calendar attribute handling.

use calendars::{calendar_from_alias, Calendar};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimeIndexError};
use crate::units::TimeUnits;

/// Calendar aliases the CF Conventions allow on a `time` variable.
const CF_CALENDARS: [&str; 9] = [
    "gregorian",
    "standard",
    "proleptic_gregorian",
    "noleap",
    "365_day",
    "all_leap",
    "366_day",
    "360_day",
    "julian",
];

/// Validate a calendar attribute against the CF vocabulary.
///
/// Returns the input unchanged when valid. `none` is a distinct, explicitly
/// unsupported case; everything else outside the list is an unknown
/// calendar.
pub fn validate_calendar(alias: &str) -> Result<&str> {
    if CF_CALENDARS.contains(&alias) {
        Ok(alias)
    } else if alias == "none" {
        Err(TimeIndexError::CalendarNone)
    } else {
        Err(calendars::CalendarError::UnknownCalendar(alias.to_string()).into())
    }
}

/// Resolve a `calendar` attribute to a [`Calendar`], defaulting to Gregorian
/// when the attribute is absent (the CF default).
pub fn get_calendar(attr: Option<&str>) -> Result<Calendar> {
    match attr {
        Some(alias) => {
            validate_calendar(alias)?;
            Ok(calendar_from_alias(alias)?)
        }
        None => Ok(Calendar::GREGORIAN),
    }
}

/// One file's time coordinate: ordered numeric values, their units, and the
/// calendar those units count in.
///
/// Constructed per query from file metadata; never cached here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAxis {
    pub values: Vec<f64>,
    pub units: TimeUnits,
    pub calendar: Calendar,
}

impl TimeAxis {
    /// Build an axis from the raw `units` and `calendar` attributes.
    pub fn new(values: Vec<f64>, units: &str, calendar_attr: Option<&str>) -> Result<Self> {
        Ok(Self {
            values,
            units: units.parse()?,
            calendar: get_calendar(calendar_attr)?,
        })
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the axis has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
