//! Time grid: the ordered monthly periods covering the horizon.
//!
//! A horizon of N years starting at (Y, M) yields exactly 12·N rows, the
//! last one being the month before the N-th anniversary of the start.

use crate::{
    error::{ProjError, ProjResult},
    types::RelativeYear,
};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar facts for one projection month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
    /// year × 12 + month, used for ordering and window filtering.
    pub date_value: i64,
    pub months_from_start: u32,
    pub relative_year: RelativeYear,
    pub relative_month: u32,
    pub quarter: u32,
    pub month_in_quarter: u32,
    /// "YYYY-MM", for display.
    pub year_month: String,
    /// Elapsed years since the start month; exponent for inflation.
    pub year_fraction: f64,
}

#[derive(Debug, Clone)]
pub struct TimeGrid {
    pub start: NaiveDate,
    /// First day of the last month in the horizon.
    pub end: NaiveDate,
    pub periods: Vec<Period>,
}

pub fn date_value(year: i32, month: u32) -> i64 {
    year as i64 * 12 + month as i64
}

/// The calendar month before (year, month). January wraps to December of
/// the prior year.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 { (year - 1, 12) } else { (year, month - 1) }
}

pub fn build_time_grid(start_year: i32, start_month: u32, projection_years: u32) -> ProjResult<TimeGrid> {
    let start = NaiveDate::from_ymd_opt(start_year, start_month, 1).ok_or_else(|| {
        ProjError::InvalidScenario {
            reason: format!("no such start month {start_year}-{start_month:02}"),
        }
    })?;

    let total_months = projection_years.checked_mul(12).filter(|m| *m > 0).ok_or_else(|| {
        ProjError::InvalidScenario {
            reason: format!("projection_years must be at least 1, got {projection_years}"),
        }
    })?;

    let anniversary = start.checked_add_months(Months::new(total_months)).ok_or_else(|| {
        ProjError::InvalidScenario {
            reason: format!("horizon of {projection_years} years overflows the calendar"),
        }
    })?;
    let (end_year, end_month) = previous_month(anniversary.year(), anniversary.month());
    let end = NaiveDate::from_ymd_opt(end_year, end_month, 1).ok_or_else(|| {
        ProjError::InvalidScenario {
            reason: format!("no such end month {end_year}-{end_month:02}"),
        }
    })?;

    let start_value = date_value(start_year, start_month);
    let end_value = date_value(end_year, end_month);
    let start_fraction = start_year as f64 + (start_month as f64 - 1.0) / 12.0;

    let mut periods = Vec::with_capacity(total_months as usize);
    let mut cursor = start;
    loop {
        let (year, month) = (cursor.year(), cursor.month());
        let value = date_value(year, month);
        if value > end_value {
            break;
        }
        let months_from_start = (value - start_value) as u32;
        periods.push(Period {
            year,
            month,
            date_value: value,
            months_from_start,
            relative_year: months_from_start / 12 + 1,
            relative_month: months_from_start % 12 + 1,
            quarter: (month - 1) / 3 + 1,
            month_in_quarter: (month - 1) % 3 + 1,
            year_month: cursor.format("%Y-%m").to_string(),
            year_fraction: (year as f64 + (month as f64 - 1.0) / 12.0) - start_fraction,
        });
        cursor = match cursor.checked_add_months(Months::new(1)) {
            Some(next) => next,
            None => break,
        };
    }

    log::debug!(
        "time grid: {} rows from {} to {}",
        periods.len(),
        start.format("%Y-%m"),
        end.format("%Y-%m")
    );

    Ok(TimeGrid { start, end, periods })
}
