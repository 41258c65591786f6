//! Calendar definitions for climate datasets.
//!
//! Climate model output uses several schemes for dividing years into
//! months/seasons and days: the real-world Gregorian calendar with its 1582
//! cutover, the Julian calendar, the proleptic Gregorian calendar, and the
//! simplified fixed-length calendars (360/365/366 days) common in long model
//! runs. This crate models each as an immutable [`Calendar`] value and maps
//! the CF Conventions `calendar` attribute strings onto them via
//! [`calendar_from_alias`].

pub mod calendar;
pub mod error;

pub use calendar::{
    calendar_from_alias, days_in_month_360, days_in_month_365, days_in_month_366,
    days_in_month_gregorian, days_in_month_julian, days_in_month_proleptic_gregorian, Calendar,
    CalendarKind,
};
pub use error::{CalendarError, Result};
