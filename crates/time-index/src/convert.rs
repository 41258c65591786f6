//! Calendar-aware conversion between timestamps and numeric time values.
//!
//! CF time values are offsets from a reference timestamp in a counting unit;
//! what one offset *means* depends on the calendar. Conversion is an
//! explicit step so that its cost and failure modes (unparseable units,
//! dates absent from the target calendar) stay visible instead of being
//! re-derived inside every comparison.

use calendars::Calendar;

use crate::error::{Result, TimeIndexError};
use crate::units::{CalDateTime, TimeUnits};

const SECONDS_PER_DAY: f64 = 86400.0;

fn invalid_date(date: &CalDateTime, calendar: &Calendar) -> TimeIndexError {
    TimeIndexError::InvalidDate {
        date: date.to_string(),
        calendar: calendar.alias(),
    }
}

/// 0-based position of the date among its year's enumerated days.
///
/// Enumeration order handles irregular day sets naturally: in the Gregorian
/// October of 1582, day 15 sits at position 4, right after day 4.
fn day_of_year_index(date: &CalDateTime, calendar: &Calendar) -> Result<u64> {
    let mut count: u64 = 0;
    for cycle in calendar.cycles_in_year(date.year) {
        if cycle == date.month {
            let days = calendar.days_in_cycle(cycle, date.year);
            let position = days
                .iter()
                .position(|&d| d == date.day)
                .ok_or_else(|| invalid_date(date, calendar))?;
            return Ok(count + position as u64);
        }
        count += calendar.count_days_in_cycle(cycle, date.year) as u64;
    }
    Err(invalid_date(date, calendar))
}

/// Signed day count from the start of year 0 to this date's midnight.
fn days_from_year_zero(date: &CalDateTime, calendar: &Calendar) -> Result<i64> {
    let mut days: i64 = 0;
    if date.year >= 0 {
        for year in 0..date.year {
            days += calendar.count_days_in_year(year) as i64;
        }
    } else {
        for year in date.year..0 {
            days -= calendar.count_days_in_year(year) as i64;
        }
    }
    Ok(days + day_of_year_index(date, calendar)? as i64)
}

/// Encode a timestamp as a numeric offset in the given units and calendar.
pub fn date_to_num(date: &CalDateTime, units: &TimeUnits, calendar: &Calendar) -> Result<f64> {
    let day_delta =
        days_from_year_zero(date, calendar)? - days_from_year_zero(&units.origin, calendar)?;
    let seconds = day_delta as f64 * SECONDS_PER_DAY + date.seconds_of_day()
        - units.origin.seconds_of_day();
    Ok(seconds / units.unit.seconds())
}

/// Decode a numeric offset back into a timestamp of the given calendar.
///
/// Sub-second fractions are rounded to the nearest second.
pub fn num_to_date(value: f64, units: &TimeUnits, calendar: &Calendar) -> Result<CalDateTime> {
    let total_seconds = (value * units.unit.seconds() + units.origin.seconds_of_day()).round();
    let day_offset = total_seconds.div_euclid(SECONDS_PER_DAY) as i64;
    let second_of_day = total_seconds.rem_euclid(SECONDS_PER_DAY) as u64;

    let mut year = units.origin.year;
    let mut day_index = day_of_year_index(&units.origin, calendar)? as i64 + day_offset;
    while day_index < 0 {
        year -= 1;
        day_index += calendar.count_days_in_year(year) as i64;
    }
    loop {
        let year_length = calendar.count_days_in_year(year) as i64;
        if day_index < year_length {
            break;
        }
        day_index -= year_length;
        year += 1;
    }

    let mut remaining = day_index as usize;
    for cycle in calendar.cycles_in_year(year) {
        let days = calendar.days_in_cycle(cycle, year);
        if remaining < days.len() {
            return Ok(CalDateTime::new(
                year,
                cycle,
                days[remaining],
                (second_of_day / 3600) as u32,
                ((second_of_day % 3600) / 60) as u32,
                (second_of_day % 60) as u32,
            ));
        }
        remaining -= days.len();
    }
    // day_index < count_days_in_year guarantees the walk lands in a cycle.
    Err(invalid_date(&units.origin, calendar))
}

/// Re-express a numeric time value in different units and/or calendar.
///
/// A value whose decoded date does not exist in the target calendar (e.g.
/// February 30 of `360_day` into `noleap`) fails rather than being clamped.
pub fn convert_value(
    value: f64,
    from_units: &TimeUnits,
    from_calendar: &Calendar,
    to_units: &TimeUnits,
    to_calendar: &Calendar,
) -> Result<f64> {
    if from_units == to_units && from_calendar == to_calendar {
        return Ok(value);
    }
    let date = num_to_date(value, from_units, from_calendar)?;
    date_to_num(&date, to_units, to_calendar)
}
