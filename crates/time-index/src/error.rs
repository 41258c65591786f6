//! Error types for temporal indexing.

use calendars::CalendarError;
use thiserror::Error;

/// Result type alias using TimeIndexError.
pub type Result<T> = std::result::Result<T, TimeIndexError>;

/// Errors raised while parsing time metadata or searching time axes.
#[derive(Debug, Error)]
pub enum TimeIndexError {
    /// Calendar lookup failed.
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    /// The CF `calendar` attribute is the explicitly unsupported `none`.
    #[error("calendar is set to 'none', which is not supported")]
    CalendarNone,

    /// The units string is not of the form `<unit> since <timestamp>`.
    #[error("cannot parse time units: {0}")]
    BadUnits(String),

    /// The timestamp string is not an ISO-like date or datetime.
    #[error("cannot parse timestamp: {0}")]
    BadTimestamp(String),

    /// The date is well-formed but absent from the calendar (e.g. February
    /// 30 in `noleap`, or inside the October 1582 gap).
    #[error("date {date} does not exist in '{calendar}' calendar")]
    InvalidDate {
        date: String,
        calendar: &'static str,
    },

    /// Ordinal index past the concatenated length of all files.
    #[error("time index {requested} out of range for {total} total steps")]
    OutOfRange { requested: i64, total: usize },

    /// Negative ordinal index (indexing from the end is not supported).
    #[error("indexing from the end is not supported (got {0})")]
    NegativeIndex(i64),

    /// The nearest candidate is farther from the query than the threshold.
    #[error("no value below threshold: nearest is {gap} away, threshold is {threshold}")]
    NoValueBelowThreshold { gap: f64, threshold: f64 },

    /// A file's time axis has no values.
    #[error("time axis is empty")]
    EmptyAxis,
}
