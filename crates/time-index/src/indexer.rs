//! Ordinal and nearest-instant search across an ordered file sequence.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::axis::TimeAxis;
use crate::convert::{convert_value, date_to_num};
use crate::error::{Result, TimeIndexError};
use crate::units::CalDateTime;

/// A resolved position: which file, and which step within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTimeIndex {
    pub file: usize,
    pub index: usize,
}

/// The requested instant, in any of the accepted forms.
///
/// Non-numeric forms are converted to the first file's units and calendar
/// before searching.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeSpec {
    /// Already a numeric offset in the first file's units.
    Offset(f64),
    /// A structured timestamp.
    Date(CalDateTime),
    /// An ISO-like string; date-only forms resolve to noon.
    Iso(String),
}

impl From<f64> for TimeSpec {
    fn from(v: f64) -> Self {
        TimeSpec::Offset(v)
    }
}

impl From<CalDateTime> for TimeSpec {
    fn from(d: CalDateTime) -> Self {
        TimeSpec::Date(d)
    }
}

impl From<&str> for TimeSpec {
    fn from(s: &str) -> Self {
        TimeSpec::Iso(s.to_string())
    }
}

/// Treat `t` as an ordinal offset across the concatenation of the files'
/// time dimensions and locate which file it lands in.
pub fn multiple_files_time_index(axes: &[TimeAxis], t: i64) -> Result<FileTimeIndex> {
    if t < 0 {
        return Err(TimeIndexError::NegativeIndex(t));
    }
    let requested = t;
    let mut remaining = t as usize;
    for (file, axis) in axes.iter().enumerate() {
        if remaining < axis.len() {
            return Ok(FileTimeIndex {
                file,
                index: remaining,
            });
        }
        remaining -= axis.len();
    }
    Err(TimeIndexError::OutOfRange {
        requested,
        total: axes.iter().map(TimeAxis::len).sum(),
    })
}

fn check_threshold(gap: f64, threshold: Option<f64>) -> Result<()> {
    if let Some(threshold) = threshold {
        if gap > threshold {
            return Err(TimeIndexError::NoValueBelowThreshold { gap, threshold });
        }
    }
    Ok(())
}

/// First arg-min of |value − t|.
fn nearest_in(values: &[f64], t: f64) -> (usize, f64) {
    let mut index = 0;
    let mut best = f64::INFINITY;
    for (k, &v) in values.iter().enumerate() {
        let gap = (v - t).abs();
        if gap < best {
            best = gap;
            index = k;
        }
    }
    (index, best)
}

/// Locate the time step nearest to the requested instant across the file
/// sequence.
///
/// The scan walks files in order, tracking the previous file's end. Once a
/// file's [start, end] interval contains `t` the answer is the nearest step
/// within that file; when `t` falls strictly before a file's start, the
/// candidate is the closer of the previous file's last step and this file's
/// first step (the previous file wins ties). With `threshold` set, a nearest
/// candidate farther than the threshold is a failure instead of a best
/// effort.
///
/// Files whose units or calendar differ from the first file's are converted
/// into the first file's reference coordinates before comparison.
pub fn nearest_time(
    axes: &[TimeAxis],
    spec: impl Into<TimeSpec>,
    threshold: Option<f64>,
) -> Result<FileTimeIndex> {
    let first = axes.first().ok_or(TimeIndexError::EmptyAxis)?;
    let t = match spec.into() {
        TimeSpec::Offset(v) => v,
        TimeSpec::Date(date) => date_to_num(&date, &first.units, &first.calendar)?,
        TimeSpec::Iso(s) => {
            let date = CalDateTime::parse_timestamp(&s)?;
            date_to_num(&date, &first.units, &first.calendar)?
        }
    };

    let mut previous: Option<(f64, usize)> = None;
    let mut last = FileTimeIndex { file: 0, index: 0 };
    let mut last_end = f64::NEG_INFINITY;
    for (file, axis) in axes.iter().enumerate() {
        if axis.is_empty() {
            return Err(TimeIndexError::EmptyAxis);
        }
        let values: Cow<'_, [f64]> =
            if axis.units == first.units && axis.calendar == first.calendar {
                Cow::Borrowed(&axis.values)
            } else {
                Cow::Owned(
                    axis.values
                        .iter()
                        .map(|&v| {
                            convert_value(
                                v,
                                &axis.units,
                                &axis.calendar,
                                &first.units,
                                &first.calendar,
                            )
                        })
                        .collect::<Result<Vec<f64>>>()?,
                )
            };
        let start = values[0];
        let end = values[values.len() - 1];

        if t >= start && t <= end {
            let (index, gap) = nearest_in(&values, t);
            check_threshold(gap, threshold)?;
            return Ok(FileTimeIndex { file, index });
        }
        if t < start {
            return match previous {
                Some((previous_end, previous_len)) => {
                    let previous_gap = (previous_end - t).abs();
                    let next_gap = (start - t).abs();
                    if previous_gap <= next_gap {
                        check_threshold(previous_gap, threshold)?;
                        Ok(FileTimeIndex {
                            file: file - 1,
                            index: previous_len - 1,
                        })
                    } else {
                        check_threshold(next_gap, threshold)?;
                        Ok(FileTimeIndex { file, index: 0 })
                    }
                }
                None => {
                    // Before everything: the first step is the only
                    // candidate.
                    check_threshold(start - t, threshold)?;
                    Ok(FileTimeIndex { file: 0, index: 0 })
                }
            };
        }

        previous = Some((end, values.len()));
        last = FileTimeIndex {
            file,
            index: values.len() - 1,
        };
        last_end = end;
    }

    check_threshold(t - last_end, threshold)?;
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(values: Vec<f64>, units: &str, calendar: Option<&str>) -> TimeAxis {
        TimeAxis::new(values, units, calendar).unwrap()
    }

    fn daily(values: Vec<f64>) -> TimeAxis {
        axis(values, "days since 2000-01-01", Some("noleap"))
    }

    #[test]
    fn ordinal_walks_files() {
        let axes = [daily(vec![0.0, 1.0, 2.0]), daily(vec![3.0, 4.0])];
        assert_eq!(
            multiple_files_time_index(&axes, 0).unwrap(),
            FileTimeIndex { file: 0, index: 0 }
        );
        assert_eq!(
            multiple_files_time_index(&axes, 2).unwrap(),
            FileTimeIndex { file: 0, index: 2 }
        );
        assert_eq!(
            multiple_files_time_index(&axes, 3).unwrap(),
            FileTimeIndex { file: 1, index: 0 }
        );
        assert_eq!(
            multiple_files_time_index(&axes, 4).unwrap(),
            FileTimeIndex { file: 1, index: 1 }
        );
    }

    #[test]
    fn ordinal_rejects_negative_and_overflow() {
        let axes = [daily(vec![0.0, 1.0])];
        assert!(matches!(
            multiple_files_time_index(&axes, -1),
            Err(TimeIndexError::NegativeIndex(-1))
        ));
        assert!(matches!(
            multiple_files_time_index(&axes, 2),
            Err(TimeIndexError::OutOfRange { .. })
        ));
    }

    #[test]
    fn nearest_inside_one_file() {
        let axes = [daily(vec![0.0, 1.0, 2.0, 3.0])];
        assert_eq!(
            nearest_time(&axes, 1.2, None).unwrap(),
            FileTimeIndex { file: 0, index: 1 }
        );
    }

    #[test]
    fn nearest_at_segment_boundary() {
        let axes = [daily(vec![0.0, 1.0, 2.0]), daily(vec![10.0, 11.0])];
        // Exactly at the second file's start.
        assert_eq!(
            nearest_time(&axes, 10.0, None).unwrap(),
            FileTimeIndex { file: 1, index: 0 }
        );
        // Exactly at the first file's end.
        assert_eq!(
            nearest_time(&axes, 2.0, None).unwrap(),
            FileTimeIndex { file: 0, index: 2 }
        );
    }

    #[test]
    fn nearest_in_gap_compares_both_sides() {
        let axes = [daily(vec![0.0, 1.0, 2.0]), daily(vec![10.0, 11.0])];
        // Closer to the first file's end.
        assert_eq!(
            nearest_time(&axes, 4.0, None).unwrap(),
            FileTimeIndex { file: 0, index: 2 }
        );
        // Closer to the second file's start.
        assert_eq!(
            nearest_time(&axes, 9.0, None).unwrap(),
            FileTimeIndex { file: 1, index: 0 }
        );
        // Equidistant: the previous file wins.
        assert_eq!(
            nearest_time(&axes, 6.0, None).unwrap(),
            FileTimeIndex { file: 0, index: 2 }
        );
    }

    #[test]
    fn threshold_turns_gap_into_failure() {
        let axes = [daily(vec![0.0, 1.0, 2.0]), daily(vec![10.0, 11.0])];
        assert!(matches!(
            nearest_time(&axes, 5.5, Some(3.0)),
            Err(TimeIndexError::NoValueBelowThreshold { .. })
        ));
        // A generous threshold lets the same query through.
        assert!(nearest_time(&axes, 5.5, Some(4.0)).is_ok());
    }

    #[test]
    fn before_everything_resolves_to_first_step() {
        let axes = [daily(vec![5.0, 6.0]), daily(vec![10.0, 11.0])];
        assert_eq!(
            nearest_time(&axes, 1.0, None).unwrap(),
            FileTimeIndex { file: 0, index: 0 }
        );
        assert!(matches!(
            nearest_time(&axes, 1.0, Some(2.0)),
            Err(TimeIndexError::NoValueBelowThreshold { .. })
        ));
    }

    #[test]
    fn after_everything_resolves_to_last_step() {
        let axes = [daily(vec![0.0, 1.0]), daily(vec![2.0, 3.0])];
        assert_eq!(
            nearest_time(&axes, 9.0, None).unwrap(),
            FileTimeIndex { file: 1, index: 1 }
        );
        assert!(matches!(
            nearest_time(&axes, 9.0, Some(1.0)),
            Err(TimeIndexError::NoValueBelowThreshold { .. })
        ));
    }

    #[test]
    fn iso_string_resolves_through_first_file_units() {
        // Daily values stamped at noon, like most daily model output.
        let axes = [daily(vec![0.5, 1.5, 2.5, 3.5])];
        assert_eq!(
            nearest_time(&axes, "2000-01-03", None).unwrap(),
            FileTimeIndex { file: 0, index: 2 }
        );
        assert_eq!(
            nearest_time(&axes, "2000-01-04T02:00:00", None).unwrap(),
            FileTimeIndex { file: 0, index: 3 }
        );
    }

    #[test]
    fn structured_date_resolves_too() {
        let axes = [daily(vec![0.5, 1.5, 2.5])];
        assert_eq!(
            nearest_time(&axes, CalDateTime::ymd(2000, 1, 2), None).unwrap(),
            FileTimeIndex { file: 0, index: 1 }
        );
    }

    #[test]
    fn mixed_units_are_reconciled() {
        // Second file counts hours from February 1; first counts days from
        // January 1. January has 31 days in noleap.
        let first = daily(vec![0.0, 1.0, 2.0]);
        let second = axis(
            vec![0.0, 24.0, 48.0],
            "hours since 2000-02-01",
            Some("noleap"),
        );
        let axes = [first, second];
        assert_eq!(
            nearest_time(&axes, "2000-02-02T00:00:00", None).unwrap(),
            FileTimeIndex { file: 1, index: 1 }
        );
    }

    #[test]
    fn mixed_calendars_are_reconciled() {
        // The second file counts in noleap, where March 1 is day 59; in the
        // first file's 360_day reference it must land on day 60.
        let first = axis(vec![0.0, 1.0], "days since 2000-01-01", Some("360_day"));
        let second = axis(vec![59.0, 60.0], "days since 2000-01-01", Some("noleap"));
        let axes = [first, second];
        assert_eq!(
            nearest_time(&axes, "2000-03-01T00:00:00", None).unwrap(),
            FileTimeIndex { file: 1, index: 0 }
        );
    }

    #[test]
    fn calendar_synonyms_do_not_force_conversion() {
        // noleap and 365_day are the same calendar; comparing canonical
        // identities avoids a spurious conversion pass.
        let first = axis(vec![0.0, 1.0], "days since 2000-01-01", Some("noleap"));
        let second = axis(vec![2.0, 3.0], "days since 2000-01-01", Some("365_day"));
        let axes = [first, second];
        assert_eq!(
            nearest_time(&axes, 3.0, None).unwrap(),
            FileTimeIndex { file: 1, index: 1 }
        );
    }

    #[test]
    fn empty_sequence_fails() {
        assert!(matches!(
            nearest_time(&[], 0.0, None),
            Err(TimeIndexError::EmptyAxis)
        ));
    }
}
