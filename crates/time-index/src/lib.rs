//! Calendar-aware temporal indexing across sequences of climate files.
//!
//! A dataset is often split across many files, each carrying its own `time`
//! variable with a CF `units` string ("days since 1850-01-01") and a
//! `calendar` attribute. This crate resolves a requested instant, ordinal
//! offset, or ISO timestamp to a `(file, index)` pair over such a sequence,
//! converting between differing units and calendars where the files
//! disagree. The sequence is assumed ordered and non-overlapping by the
//! caller; nothing here re-sorts it.

pub mod axis;
pub mod convert;
pub mod error;
pub mod indexer;
pub mod units;

pub use axis::{get_calendar, validate_calendar, TimeAxis};
pub use convert::{convert_value, date_to_num, num_to_date};
pub use error::{Result, TimeIndexError};
pub use indexer::{multiple_files_time_index, nearest_time, FileTimeIndex, TimeSpec};
pub use units::{CalDateTime, TimeUnit, TimeUnits};
