//! Month grid construction.
//!
//! A grid always starts on a Sunday and ends on a Saturday, covering the whole
//! requested month plus the leading/trailing days of the adjacent months that
//! are needed to fill the first and last rows.

use std::collections::HashMap;

use chrono::{Datelike, Days, Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{CalendarError, Result};
use crate::types::FinancialDataPoint;

/// One cell of the month grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_today: bool,
    pub is_selected: bool,
    pub is_weekend: bool,
    pub is_outside_month: bool,
    pub financial_data: Option<FinancialDataPoint>,
}

/// Rows of seven days, Sunday first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarGrid {
    pub year: i32,
    /// 1-based month of the displayed month.
    pub month: u32,
    pub weeks: Vec<[CalendarDay; 7]>,
}

impl CalendarGrid {
    pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.weeks.iter().flat_map(|week| week.iter())
    }

    pub fn day_count(&self) -> usize {
        self.weeks.len() * 7
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.weeks.first().map(|week| week[0].date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.weeks.last().map(|week| week[6].date)
    }

    pub fn find(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days().find(|day| day.date == date)
    }

    pub fn selected(&self) -> Option<&CalendarDay> {
        self.days().find(|day| day.is_selected)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        matches!((self.first_date(), self.last_date()), (Some(first), Some(last)) if first <= date && date <= last)
    }
}

/// First and last day of a month given a zero-based month that may be out of
/// range. Months normalise into neighbouring years (12 → January next year,
/// -1 → December previous year).
pub fn month_bounds(year: i32, month0: i32) -> Result<(NaiveDate, NaiveDate)> {
    let (norm_year, month) = normalize_month(year, month0)?;
    let out_of_range = || CalendarError::DateOutOfRange { year, month: month0 };

    let first = NaiveDate::from_ymd_opt(norm_year, month, 1).ok_or_else(out_of_range)?;
    let (next_year, next_month) = if month == 12 { (norm_year + 1, 1) } else { (norm_year, month + 1) };
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .ok_or_else(out_of_range)?;
    Ok((first, last))
}

/// Returns (year, 1-based month) after folding overflowing months into years.
pub fn normalize_month(year: i32, month0: i32) -> Result<(i32, u32)> {
    let total = i64::from(year) * 12 + i64::from(month0);
    let norm_year = i32::try_from(total.div_euclid(12))
        .map_err(|_| CalendarError::DateOutOfRange { year, month: month0 })?;
    Ok((norm_year, total.rem_euclid(12) as u32 + 1))
}

/// Builds the grid for `month0` (zero-based) of `year`.
///
/// `today` is the caller's current calendar date; `selected` marks at most one
/// cell. Series points are attached by exact `YYYY-MM-DD` key, first match
/// wins on duplicates, and malformed keys are skipped.
pub fn build_grid(
    year: i32,
    month0: i32,
    series: &[FinancialDataPoint],
    selected: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<CalendarGrid> {
    let (first, last) = month_bounds(year, month0)?;
    let out_of_range = || CalendarError::DateOutOfRange { year, month: month0 };

    let lead = u64::from(first.weekday().num_days_from_sunday());
    let trail = 6 - u64::from(last.weekday().num_days_from_sunday());
    let grid_start = first.checked_sub_days(Days::new(lead)).ok_or_else(out_of_range)?;
    let grid_end = last.checked_add_days(Days::new(trail)).ok_or_else(out_of_range)?;

    let index = index_series(series, grid_start, grid_end);

    let mut weeks = Vec::with_capacity(6);
    let mut week_start = grid_start;
    while week_start <= grid_end {
        // every date up to grid_end is representable, so the adds cannot overflow
        let week: [CalendarDay; 7] = std::array::from_fn(|offset| {
            let date = week_start + Days::new(offset as u64);
            let weekday = date.weekday().num_days_from_sunday();
            CalendarDay {
                date,
                is_today: date == today,
                is_selected: selected == Some(date),
                is_weekend: weekday == 0 || weekday == 6,
                is_outside_month: (date.year(), date.month()) != (first.year(), first.month()),
                financial_data: index.get(&date).map(|point| (*point).clone()),
            }
        });
        weeks.push(week);
        match week_start.checked_add_days(Days::new(7)) {
            Some(next) => week_start = next,
            None => break,
        }
    }

    debug!(
        year = first.year(),
        month = first.month(),
        rows = weeks.len(),
        attached = index.len(),
        "built calendar grid"
    );

    Ok(CalendarGrid { year: first.year(), month: first.month(), weeks })
}

/// [`build_grid`] against the local clock's calendar date.
pub fn build_grid_today(
    year: i32,
    month0: i32,
    series: &[FinancialDataPoint],
    selected: Option<NaiveDate>,
) -> Result<CalendarGrid> {
    build_grid(year, month0, series, selected, Local::now().date_naive())
}

/// Date → point index restricted to `[start, end]`. First occurrence wins.
fn index_series(
    series: &[FinancialDataPoint],
    start: NaiveDate,
    end: NaiveDate,
) -> HashMap<NaiveDate, &FinancialDataPoint> {
    let mut index = HashMap::new();
    let mut duplicates = 0usize;
    for point in series {
        let Some(date) = point.parsed_date() else {
            warn!(key = %point.date, "skipping data point with malformed date key");
            continue;
        };
        if date < start || date > end {
            continue;
        }
        if index.contains_key(&date) {
            duplicates += 1;
            continue;
        }
        index.insert(date, point);
    }
    if duplicates > 0 {
        debug!(duplicates, "ignored duplicate date keys, first occurrence kept");
    }
    index
}
