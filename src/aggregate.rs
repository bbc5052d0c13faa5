//! Time-bucket aggregation of a daily series into weekly or monthly records.
//!
//! Per bucket: open is the first member's open, close the last member's
//! close, high/low are the extremes, volume is summed, the remaining metrics
//! are simple means, and performance is recomputed from the bucket's own
//! open and close.

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate};
use tracing::{debug, warn};

use crate::types::{format_date_key, parse_bucket_key, AggregatedPeriod, FinancialDataPoint, TimeFrame};

/// Collapses `series` into one record per bucket of `time_frame`.
///
/// Input is parsed and stably sorted by date first; points whose key cannot
/// be parsed are skipped and only the first point per date is kept. `Daily` returns the prepared points unchanged.
pub fn aggregate(series: &[FinancialDataPoint], time_frame: TimeFrame) -> Vec<AggregatedPeriod> {
    let prepared = prepare(series);

    if time_frame == TimeFrame::Daily {
        return prepared.into_iter().map(|(_, point)| point.clone()).collect();
    }

    // Buckets in first-seen order; scanning a sorted series keeps them ascending.
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<&FinancialDataPoint>> = HashMap::new();
    for (date, point) in prepared {
        let key = bucket_key(date, time_frame);
        buckets
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(point);
    }

    let periods: Vec<AggregatedPeriod> = order
        .into_iter()
        .filter_map(|key| {
            let members = buckets.remove(&key)?;
            summarize(key, &members)
        })
        .collect();

    debug!(
        time_frame = %time_frame,
        input = series.len(),
        buckets = periods.len(),
        "aggregated series"
    );
    periods
}

/// First calendar day of the bucket containing `date`.
pub fn bucket_start(date: NaiveDate, time_frame: TimeFrame) -> NaiveDate {
    match time_frame {
        TimeFrame::Daily => date,
        TimeFrame::Weekly => {
            let back = Days::new(u64::from(date.weekday().num_days_from_sunday()));
            date.checked_sub_days(back).unwrap_or(date)
        }
        TimeFrame::Monthly => date.with_day(1).unwrap_or(date),
    }
}

/// Bucket key for `date`: the ISO date for daily, the week's Sunday for
/// weekly, `YYYY-MM` for monthly.
pub fn bucket_key(date: NaiveDate, time_frame: TimeFrame) -> String {
    match time_frame {
        TimeFrame::Daily | TimeFrame::Weekly => format_date_key(bucket_start(date, time_frame)),
        TimeFrame::Monthly => date.format("%Y-%m").to_string(),
    }
}

/// The period in `periods` whose bucket holds `date`.
pub fn period_containing<'a>(
    periods: &'a [AggregatedPeriod],
    date: NaiveDate,
    time_frame: TimeFrame,
) -> Option<&'a AggregatedPeriod> {
    let key = bucket_key(date, time_frame);
    periods.iter().find(|period| period.date == key)
}

/// `(close - open) / open * 100`; zero when open is zero or the result is
/// not finite.
pub fn performance(open: f64, close: f64) -> f64 {
    if open == 0.0 {
        return 0.0;
    }
    let pct = (close - open) / open * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

fn prepare(series: &[FinancialDataPoint]) -> Vec<(NaiveDate, &FinancialDataPoint)> {
    let mut prepared: Vec<(NaiveDate, &FinancialDataPoint)> = series
        .iter()
        .filter_map(|point| match parse_bucket_key(&point.date) {
            Some(date) => Some((date, point)),
            None => {
                warn!(key = %point.date, "skipping data point with malformed date key");
                None
            }
        })
        .collect();
    // stable: equal dates keep their input order, so dedup keeps the first
    prepared.sort_by_key(|(date, _)| *date);
    let before = prepared.len();
    prepared.dedup_by_key(|(date, _)| *date);
    if prepared.len() < before {
        debug!(duplicates = before - prepared.len(), "ignored duplicate date keys, first occurrence kept");
    }
    prepared
}

fn summarize(key: String, members: &[&FinancialDataPoint]) -> Option<AggregatedPeriod> {
    let first = members.first()?;
    let last = members.last()?;
    let count = members.len() as f64;
    let mean = |field: fn(&FinancialDataPoint) -> f64| members.iter().map(|m| field(*m)).sum::<f64>() / count;

    Some(AggregatedPeriod {
        date: key,
        open: first.open,
        high: members.iter().map(|m| m.high).fold(f64::NEG_INFINITY, f64::max),
        low: members.iter().map(|m| m.low).fold(f64::INFINITY, f64::min),
        close: last.close,
        volume: members.iter().map(|m| m.volume).sum(),
        liquidity: mean(|m| m.liquidity),
        volatility: mean(|m| m.volatility),
        performance: performance(first.open, last.close),
        moving_average: mean(|m| m.moving_average),
        rsi: mean(|m| m.rsi),
        vix: mean(|m| m.vix),
    })
}
