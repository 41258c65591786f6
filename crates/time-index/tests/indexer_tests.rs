//! Multi-file scenarios mirroring how a subsetting service walks a dataset
//! split into one file per year.

use time_index::{
    multiple_files_time_index, nearest_time, CalDateTime, FileTimeIndex, TimeAxis, TimeIndexError,
};

/// Three years of daily noleap data, one file per year, each file counting
/// days from its own January 1 — exactly how CMIP-style archives slice.
fn yearly_files() -> Vec<TimeAxis> {
    (0..3)
        .map(|k| {
            let year = 2000 + k;
            let values: Vec<f64> = (0..365).map(|d| d as f64 + 0.5).collect();
            TimeAxis::new(
                values,
                &format!("days since {year}-01-01"),
                Some("noleap"),
            )
            .unwrap()
        })
        .collect()
}

#[test]
fn ordinal_index_spans_years() {
    let axes = yearly_files();
    assert_eq!(
        multiple_files_time_index(&axes, 364).unwrap(),
        FileTimeIndex { file: 0, index: 364 }
    );
    assert_eq!(
        multiple_files_time_index(&axes, 365).unwrap(),
        FileTimeIndex { file: 1, index: 0 }
    );
    assert_eq!(
        multiple_files_time_index(&axes, 3 * 365 - 1).unwrap(),
        FileTimeIndex { file: 2, index: 364 }
    );
    assert!(matches!(
        multiple_files_time_index(&axes, 3 * 365),
        Err(TimeIndexError::OutOfRange { .. })
    ));
}

#[test]
fn iso_query_lands_in_the_right_year() {
    let axes = yearly_files();
    // Different origins per file force the conversion path for every file
    // after the first.
    assert_eq!(
        nearest_time(&axes, "2001-07-01", None).unwrap(),
        FileTimeIndex {
            file: 1,
            index: 181
        }
    );
    assert_eq!(
        nearest_time(&axes, "2002-12-31", None).unwrap(),
        FileTimeIndex {
            file: 2,
            index: 364
        }
    );
}

#[test]
fn year_boundary_resolves_to_adjacent_steps() {
    let axes = yearly_files();
    // Midnight new year 2001: the last step of 2000 (stamped Dec 31 noon)
    // and the first of 2001 (Jan 1 noon) are both half a day away; the
    // earlier file wins the tie.
    assert_eq!(
        nearest_time(&axes, "2001-01-01T00:00:00", None).unwrap(),
        FileTimeIndex {
            file: 0,
            index: 364
        }
    );
}

#[test]
fn threshold_rejects_past_the_archive() {
    let axes = yearly_files();
    // Ten days past the end of the archive, tolerance of two days.
    assert!(matches!(
        nearest_time(&axes, "2003-01-10", Some(2.0)),
        Err(TimeIndexError::NoValueBelowThreshold { .. })
    ));
    // Without a threshold the closest available step is returned.
    assert_eq!(
        nearest_time(&axes, "2003-01-10", None).unwrap(),
        FileTimeIndex {
            file: 2,
            index: 364
        }
    );
}

#[test]
fn structured_dates_match_iso_strings() {
    let axes = yearly_files();
    let by_date = nearest_time(&axes, CalDateTime::ymd(2001, 7, 1), None).unwrap();
    let by_iso = nearest_time(&axes, "2001-07-01", None).unwrap();
    assert_eq!(by_date, by_iso);
}

#[test]
fn queried_offsets_are_in_first_file_coordinates() {
    let axes = yearly_files();
    // 365.5 days since 2000-01-01 == noon, January 1st 2001.
    assert_eq!(
        nearest_time(&axes, 365.5, None).unwrap(),
        FileTimeIndex { file: 1, index: 0 }
    );
}
