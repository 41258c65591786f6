//! Error types for calendar operations.

use thiserror::Error;

/// Result type alias using CalendarError.
pub type Result<T> = std::result::Result<T, CalendarError>;

/// Errors raised by calendar lookups and queries.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// The alias does not name any built-in calendar.
    #[error("unknown calendar: {0}")]
    UnknownCalendar(String),

    /// The calendar has no concept of leap years.
    #[error("leap year concept not defined for '{0}' calendar")]
    NoLeapConcept(&'static str),
}
