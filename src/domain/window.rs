//! Reconciles a requested simulation window against dataset coverage.
//!
//! Clipping is one-directional per bound: a start before the data is moved
//! up to the first date, an end after the data is moved back to the last
//! date. A window that does not overlap the data at all is rejected.

use crate::domain::error::{RangeBound, ScoretraderError};
use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate, ScoretraderError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        ScoretraderError::InvalidDate {
            field: field.to_string(),
            value: value.to_string(),
        }
    })
}

/// Resolve a user window given as `YYYY-MM-DD` strings against `dates`.
pub fn reconcile(
    dates: &[NaiveDate],
    user_start: &str,
    user_end: &str,
) -> Result<ResolvedWindow, ScoretraderError> {
    let start = parse_date(user_start, "start_date")?;
    let end = parse_date(user_end, "end_date")?;

    let (Some(&first), Some(&last)) = (dates.first(), dates.last()) else {
        return Err(ScoretraderError::EmptyDataset);
    };

    reconcile_dates(first, last, start, end)
}

pub fn reconcile_dates(
    df_start: NaiveDate,
    df_end: NaiveDate,
    user_start: NaiveDate,
    user_end: NaiveDate,
) -> Result<ResolvedWindow, ScoretraderError> {
    if user_start >= user_end {
        return Err(ScoretraderError::InvalidRange {
            start: user_start,
            end: user_end,
        });
    }

    if user_start >= df_end {
        return Err(ScoretraderError::RangeOutsideDataset {
            bound: RangeBound::Start,
            requested: user_start,
            first: df_start,
            last: df_end,
        });
    } else if user_end <= df_start {
        return Err(ScoretraderError::RangeOutsideDataset {
            bound: RangeBound::End,
            requested: user_end,
            first: df_start,
            last: df_end,
        });
    }

    let start_date = if user_start < df_start {
        df_start
    } else {
        user_start
    };
    let end_date = if user_end > df_end { df_end } else { user_end };

    Ok(ResolvedWindow {
        start_date,
        end_date,
    })
}
