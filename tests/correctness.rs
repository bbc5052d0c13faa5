//! Correctness tests for grid construction and period aggregation.
//!
//! Builds grids for known months and aggregates hand-written series, then
//! asserts exact shapes and OHLC values.

use std::collections::HashSet;

use chrono::{Datelike, Days, NaiveDate, Weekday};

use financial_calendar::aggregate::{aggregate, bucket_key, performance};
use financial_calendar::error::CalendarError;
use financial_calendar::grid::{build_grid, month_bounds, CalendarGrid};
use financial_calendar::types::{FinancialDataPoint, TimeFrame};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn point(key: &str, open: f64, high: f64, low: f64, close: f64, volume: f64) -> FinancialDataPoint {
    FinancialDataPoint {
        date: key.to_string(),
        open,
        high,
        low,
        close,
        volume,
        liquidity: 60.0,
        volatility: 3.0,
        performance: performance(open, close),
        moving_average: open,
        rsi: 50.0,
        vix: 20.0,
    }
}

fn assert_well_formed(grid: &CalendarGrid) {
    let first = grid.first_date().expect("grid should not be empty");
    let last = grid.last_date().expect("grid should not be empty");
    assert_eq!(grid.day_count() % 7, 0, "day count must be a multiple of 7");
    assert_eq!(first.weekday(), Weekday::Sun, "grid must start on Sunday, got {first}");
    assert_eq!(last.weekday(), Weekday::Sat, "grid must end on Saturday, got {last}");

    // consecutive, no duplicates, no gaps
    let dates: Vec<NaiveDate> = grid.days().map(|d| d.date).collect();
    for pair in dates.windows(2) {
        assert_eq!(pair[0] + Days::new(1), pair[1], "dates must be consecutive");
    }
    let unique: HashSet<_> = dates.iter().collect();
    assert_eq!(unique.len(), dates.len(), "no date may appear twice");

    let (month_first, month_last) = month_bounds(grid.year, grid.month as i32 - 1).unwrap();
    let mut d = month_first;
    while d <= month_last {
        let cell = grid.find(d).unwrap_or_else(|| panic!("{d} missing from grid"));
        assert!(!cell.is_outside_month, "{d} belongs to the displayed month");
        d = d + Days::new(1);
    }
    let inside = grid.days().filter(|c| !c.is_outside_month).count();
    assert_eq!(inside as i64, (month_last - month_first).num_days() + 1);
}

// ── Test 1: March 2024 (starts Friday) with an empty series ──
#[test]
fn test_march_2024_empty_series() {
    let grid = build_grid(2024, 2, &[], None, date(2024, 3, 15)).unwrap();
    assert_well_formed(&grid);

    assert_eq!(grid.weeks.len(), 6, "Feb 25 .. Apr 6 spans six rows");
    assert_eq!(grid.first_date(), Some(date(2024, 2, 25)));
    assert_eq!(grid.last_date(), Some(date(2024, 4, 6)));
    assert!(grid.days().all(|c| c.financial_data.is_none()));

    // leading days come from February, trailing from April
    assert!(grid.weeks[0][..5].iter().all(|c| c.is_outside_month && c.date.month() == 2));
    assert!(!grid.weeks[0][5].is_outside_month, "Friday March 1 is inside");
    assert!(grid.weeks[5][1..].iter().all(|c| c.is_outside_month && c.date.month() == 4));
}

// ── Test 2: month starting Sunday / ending Saturday ──
#[test]
fn test_zero_leading_and_trailing_days() {
    // September 2024 starts on Sunday
    let sept = build_grid(2024, 8, &[], None, date(2024, 1, 1)).unwrap();
    assert_well_formed(&sept);
    assert_eq!(sept.first_date(), Some(date(2024, 9, 1)));
    assert!(!sept.weeks[0][0].is_outside_month);

    // August 2024 ends on Saturday
    let aug = build_grid(2024, 7, &[], None, date(2024, 1, 1)).unwrap();
    assert_well_formed(&aug);
    assert_eq!(aug.last_date(), Some(date(2024, 8, 31)));
    assert!(!aug.weeks.last().unwrap()[6].is_outside_month);

    // February 2015: Sunday the 1st through Saturday the 28th, exactly four rows
    let feb = build_grid(2015, 1, &[], None, date(2024, 1, 1)).unwrap();
    assert_well_formed(&feb);
    assert_eq!(feb.weeks.len(), 4);
    assert!(feb.days().all(|c| !c.is_outside_month));
}

// ── Test 3: every month of several years is well formed ──
#[test]
fn test_all_months_well_formed() {
    for year in [1999, 2000, 2023, 2024, 2025, 2100] {
        for month0 in 0..12 {
            let grid = build_grid(year, month0, &[], None, date(2024, 6, 1)).unwrap();
            assert_eq!((grid.year, grid.month), (year, month0 as u32 + 1));
            assert_well_formed(&grid);
            assert!((4..=6).contains(&grid.weeks.len()));
        }
    }
}

// ── Test 4: weekend and today/selected flags ──
#[test]
fn test_day_flags() {
    let today = date(2024, 3, 15);
    let selected = date(2024, 3, 20);
    let grid = build_grid(2024, 2, &[], Some(selected), today).unwrap();

    for week in &grid.weeks {
        assert!(week[0].is_weekend && week[6].is_weekend);
        assert!(week[1..6].iter().all(|c| !c.is_weekend));
    }

    let todays: Vec<_> = grid.days().filter(|c| c.is_today).collect();
    assert_eq!(todays.len(), 1);
    assert_eq!(todays[0].date, today);

    assert_eq!(grid.selected().map(|c| c.date), Some(selected));
    assert_eq!(grid.days().filter(|c| c.is_selected).count(), 1);

    // today in a visible neighbouring-month cell still counts
    let grid = build_grid(2024, 2, &[], None, date(2024, 4, 2)).unwrap();
    assert_eq!(grid.days().filter(|c| c.is_today).count(), 1);

    // today outside the displayed range
    let grid = build_grid(2024, 2, &[], None, date(2025, 1, 1)).unwrap();
    assert_eq!(grid.days().filter(|c| c.is_today).count(), 0);
    assert!(grid.selected().is_none());
}

// ── Test 5: data attachment, duplicates, malformed keys ──
#[test]
fn test_data_attachment() {
    let series = vec![
        point("2024-03-04", 100.0, 105.0, 98.0, 102.0, 1000.0),
        point("2024-03-05", 102.0, 106.0, 101.0, 104.0, 1500.0),
        // duplicate key: first occurrence wins
        point("2024-03-05", 1.0, 1.0, 1.0, 1.0, 1.0),
        point("not-a-date", 1.0, 1.0, 1.0, 1.0, 1.0),
        point("2024-02-30", 1.0, 1.0, 1.0, 1.0, 1.0),
        point("2024-03", 1.0, 1.0, 1.0, 1.0, 1.0),
        // outside the displayed range
        point("2024-05-01", 1.0, 1.0, 1.0, 1.0, 1.0),
    ];
    let grid = build_grid(2024, 2, &series, None, date(2024, 3, 1)).unwrap();
    assert_well_formed(&grid);

    let attached: Vec<_> = grid.days().filter(|c| c.financial_data.is_some()).collect();
    assert_eq!(attached.len(), 2);

    let mar5 = grid.find(date(2024, 3, 5)).unwrap();
    let data = mar5.financial_data.as_ref().unwrap();
    assert_eq!(data.close, 104.0, "first duplicate should win");
    assert_eq!(grid.find(date(2024, 3, 4)).unwrap().financial_data.as_ref().unwrap().open, 100.0);

    // source series is untouched
    assert_eq!(series.len(), 7);
    assert_eq!(series[2].close, 1.0);
}

// ── Test 6: out-of-range months normalise ──
#[test]
fn test_month_normalization() {
    let today = date(2024, 1, 1);
    let thirteenth = build_grid(2024, 12, &[], None, today).unwrap();
    let january = build_grid(2025, 0, &[], None, today).unwrap();
    assert_eq!(thirteenth, january);
    assert_eq!((thirteenth.year, thirteenth.month), (2025, 1));

    let minus_one = build_grid(2024, -1, &[], None, today).unwrap();
    assert_eq!((minus_one.year, minus_one.month), (2023, 12));
    assert_well_formed(&minus_one);

    let far = build_grid(2024, 25, &[], None, today).unwrap();
    assert_eq!((far.year, far.month), (2026, 2));

    match build_grid(300_000, 0, &[], None, today) {
        Err(CalendarError::DateOutOfRange { year, .. }) => assert_eq!(year, 300_000),
        other => panic!("expected DateOutOfRange, got {other:?}"),
    }
}

// ── Test 7: monthly aggregation example ──
#[test]
fn test_monthly_example() {
    let series = vec![
        point("2024-03-04", 100.0, 105.0, 98.0, 102.0, 1000.0),
        point("2024-03-05", 102.0, 106.0, 101.0, 104.0, 1500.0),
    ];
    let periods = aggregate(&series, TimeFrame::Monthly);
    assert_eq!(periods.len(), 1);
    let p = &periods[0];
    assert_eq!(p.date, "2024-03");
    assert_eq!(p.open, 100.0);
    assert_eq!(p.close, 104.0);
    assert_eq!(p.high, 106.0);
    assert_eq!(p.low, 98.0);
    assert_eq!(p.volume, 2500.0);
    assert!((p.performance - 4.0).abs() < 1e-9, "performance should be 4.0, got {}", p.performance);
}

// ── Test 8: weekly buckets start on Sunday ──
// Seven consecutive days Sunday..Saturday form one bucket; the same seven
// days shifted to Monday..Sunday split into two, because the Sunday opens
// the next bucket.
#[test]
fn test_weekly_bucketing() {
    let sun_to_sat: Vec<_> = (0..7)
        .map(|i| {
            let d = date(2024, 3, 3) + Days::new(i);
            let base = 100.0 + i as f64;
            point(&d.format("%Y-%m-%d").to_string(), base, base + 5.0, base - 3.0, base + 1.0, 100.0 * (i + 1) as f64)
        })
        .collect();
    let weekly = aggregate(&sun_to_sat, TimeFrame::Weekly);
    assert_eq!(weekly.len(), 1);
    let w = &weekly[0];
    assert_eq!(w.date, "2024-03-03");
    assert_eq!(w.open, 100.0, "open is Sunday's open");
    assert_eq!(w.close, 107.0, "close is Saturday's close");
    assert_eq!(w.high, 111.0);
    assert_eq!(w.low, 97.0);
    assert_eq!(w.volume, 2800.0, "volume is the sum of all seven days");

    let mon_to_sun: Vec<_> = (0..7)
        .map(|i| {
            let d = date(2024, 3, 4) + Days::new(i);
            point(&d.format("%Y-%m-%d").to_string(), 100.0, 101.0, 99.0, 100.0, 10.0)
        })
        .collect();
    let weekly = aggregate(&mon_to_sun, TimeFrame::Weekly);
    let keys: Vec<_> = weekly.iter().map(|p| p.date.as_str()).collect();
    assert_eq!(keys, ["2024-03-03", "2024-03-10"]);
    assert_eq!(weekly[0].volume, 60.0);
    assert_eq!(weekly[1].volume, 10.0);
}

// ── Test 9: means, recomputed performance ──
#[test]
fn test_bucket_means_and_performance() {
    let mut a = point("2024-03-04", 100.0, 110.0, 90.0, 110.0, 1.0);
    a.liquidity = 40.0;
    a.volatility = 2.0;
    a.rsi = 30.0;
    a.vix = 10.0;
    a.moving_average = 95.0;
    let mut b = point("2024-03-05", 110.0, 120.0, 100.0, 99.0, 1.0);
    b.liquidity = 80.0;
    b.volatility = 6.0;
    b.rsi = 70.0;
    b.vix = 30.0;
    b.moving_average = 105.0;

    let w = &aggregate(&[a.clone(), b.clone()], TimeFrame::Weekly)[0];
    assert_eq!(w.liquidity, 60.0);
    assert_eq!(w.volatility, 4.0);
    assert_eq!(w.rsi, 50.0);
    assert_eq!(w.vix, 20.0);
    assert_eq!(w.moving_average, 100.0);

    // +10% then -10%: averaging the daily returns would give 0, the bucket returned -1%
    assert!((a.performance - 10.0).abs() < 1e-9);
    assert!((b.performance + 10.0).abs() < 1e-9);
    assert!((w.performance + 1.0).abs() < 1e-9, "period return is (99-100)/100, got {}", w.performance);
}

// ── Test 10: daily identity, single points, idempotence ──
#[test]
fn test_daily_identity_and_idempotence() {
    let series = vec![
        point("2024-01-31", 10.0, 12.0, 9.0, 11.0, 5.0),
        point("2024-02-15", 11.0, 13.0, 10.0, 12.5, 6.0),
        point("2024-03-01", 12.5, 14.0, 12.0, 13.0, 7.0),
    ];
    assert_eq!(aggregate(&series, TimeFrame::Daily), series);

    let monthly = aggregate(&series, TimeFrame::Monthly);
    let keys: Vec<_> = monthly.iter().map(|p| p.date.as_str()).collect();
    assert_eq!(keys, ["2024-01", "2024-02", "2024-03"]);
    for (bucket, source) in monthly.iter().zip(&series) {
        let mut expected = source.clone();
        expected.date = bucket.date.clone();
        assert_eq!(bucket, &expected, "single-point bucket equals its point");
    }

    assert_eq!(aggregate(&monthly, TimeFrame::Monthly), monthly);
    assert!(aggregate(&[], TimeFrame::Weekly).is_empty());
    assert!(aggregate(&[], TimeFrame::Daily).is_empty());
}

// ── Test 11: unsorted input and malformed keys ──
#[test]
fn test_unsorted_and_malformed_input() {
    let sorted = vec![
        point("2024-03-04", 100.0, 105.0, 98.0, 102.0, 1000.0),
        point("2024-03-05", 102.0, 106.0, 101.0, 104.0, 1500.0),
        point("2024-03-11", 104.0, 108.0, 103.0, 107.0, 500.0),
    ];
    let shuffled = vec![
        sorted[2].clone(),
        point("garbage", 1.0, 1.0, 1.0, 1.0, 1.0),
        sorted[0].clone(),
        sorted[1].clone(),
    ];

    assert_eq!(aggregate(&shuffled, TimeFrame::Weekly), aggregate(&sorted, TimeFrame::Weekly));
    assert_eq!(aggregate(&shuffled, TimeFrame::Daily), sorted);

    let weekly = aggregate(&shuffled, TimeFrame::Weekly);
    assert_eq!(weekly.len(), 2);
    assert_eq!(weekly[0].open, 100.0);
    assert_eq!(weekly[0].close, 104.0);
}

#[test]
fn test_duplicate_dates_keep_first_point() {
    let series = vec![
        point("2024-03-04", 100.0, 105.0, 98.0, 102.0, 1000.0),
        point("2024-03-04", 1.0, 500.0, 0.5, 400.0, 7.0),
        point("2024-03-05", 102.0, 106.0, 101.0, 104.0, 1500.0),
    ];

    let monthly = aggregate(&series, TimeFrame::Monthly);
    assert_eq!(monthly.len(), 1);
    assert_eq!(monthly[0].volume, 2500.0);
    assert_eq!(monthly[0].open, 100.0);
    assert_eq!(monthly[0].close, 104.0);
    assert_eq!(monthly[0].high, 106.0);
    assert_eq!(monthly[0].low, 98.0);

    let daily = aggregate(&series, TimeFrame::Daily);
    assert_eq!(daily, vec![series[0].clone(), series[2].clone()]);

    // the grid cell shows the same point the buckets were built from
    let grid = build_grid(2024, 2, &series, None, date(2024, 3, 29)).unwrap();
    let cell = grid.find(date(2024, 3, 4)).unwrap();
    assert_eq!(cell.financial_data.as_ref().map(|p| p.volume), Some(1000.0));
}

// ── Test 12: zero open ──
#[test]
fn test_zero_open_performance() {
    let series = vec![
        point("2024-03-04", 0.0, 5.0, 0.0, 4.0, 1.0),
        point("2024-03-05", 4.0, 6.0, 3.0, 5.0, 1.0),
    ];
    let monthly = aggregate(&series, TimeFrame::Monthly);
    assert_eq!(monthly[0].open, 0.0);
    assert_eq!(monthly[0].performance, 0.0, "zero open reports a flat return");
    assert!(monthly[0].performance.is_finite());
    assert_eq!(performance(0.0, 10.0), 0.0);
}

// ── Test 13: year boundary and DST weeks ──
#[test]
fn test_boundary_bucketing() {
    // Dec 29 2024 is a Sunday; the week runs into 2025
    let series = vec![
        point("2024-12-27", 100.0, 101.0, 99.0, 100.5, 1.0),
        point("2024-12-30", 100.5, 102.0, 100.0, 101.0, 2.0),
        point("2024-12-31", 101.0, 103.0, 100.0, 102.0, 3.0),
        point("2025-01-02", 102.0, 104.0, 101.0, 103.0, 4.0),
        point("2025-01-03", 103.0, 105.0, 102.0, 104.0, 5.0),
    ];
    let weekly = aggregate(&series, TimeFrame::Weekly);
    let keys: Vec<_> = weekly.iter().map(|p| p.date.as_str()).collect();
    assert_eq!(keys, ["2024-12-22", "2024-12-29"]);
    assert_eq!(weekly[1].volume, 14.0);
    assert_eq!(weekly[1].open, 100.5);
    assert_eq!(weekly[1].close, 104.0);

    let monthly = aggregate(&series, TimeFrame::Monthly);
    let keys: Vec<_> = monthly.iter().map(|p| p.date.as_str()).collect();
    assert_eq!(keys, ["2024-12", "2025-01"]);

    // US daylight-saving transitions fall on Sundays; buckets must not shift
    assert_eq!(bucket_key(date(2024, 3, 8), TimeFrame::Weekly), "2024-03-03");
    assert_eq!(bucket_key(date(2024, 3, 10), TimeFrame::Weekly), "2024-03-10");
    assert_eq!(bucket_key(date(2024, 3, 11), TimeFrame::Weekly), "2024-03-10");
    assert_eq!(bucket_key(date(2024, 11, 2), TimeFrame::Weekly), "2024-10-27");
    assert_eq!(bucket_key(date(2024, 11, 3), TimeFrame::Weekly), "2024-11-03");
    assert_eq!(bucket_key(date(2024, 11, 4), TimeFrame::Weekly), "2024-11-03");

    // December grid spills into January without off-by-one
    let dec = build_grid(2024, 11, &series, None, date(2024, 12, 31)).unwrap();
    assert_well_formed(&dec);
    assert_eq!(dec.last_date(), Some(date(2025, 1, 4)));
    let jan3 = dec.find(date(2025, 1, 3)).unwrap();
    assert!(jan3.is_outside_month);
    assert_eq!(jan3.financial_data.as_ref().unwrap().close, 104.0);
}

// ── Test 14: OHLC invariant is checked, not assumed ──
#[test]
fn test_ohlc_consistency_check() {
    assert!(point("2024-03-04", 100.0, 105.0, 98.0, 102.0, 1.0).is_consistent());
    assert!(!point("2024-03-04", 100.0, 101.0, 98.0, 102.0, 1.0).is_consistent(), "close above high");
    assert!(!point("2024-03-04", 97.0, 105.0, 98.0, 102.0, 1.0).is_consistent(), "open below low");
    assert!(!point("2024-03-04", f64::NAN, 105.0, 98.0, 102.0, 1.0).is_consistent());

    // aggregation tolerates inconsistent members and still applies its rules
    let bad = vec![
        point("2024-03-04", 100.0, 90.0, 110.0, 102.0, 1.0),
        point("2024-03-05", 102.0, 95.0, 105.0, 104.0, 1.0),
    ];
    let w = &aggregate(&bad, TimeFrame::Weekly)[0];
    assert_eq!(w.high, 95.0);
    assert_eq!(w.low, 105.0);
    assert_eq!(w.open, 100.0);
    assert_eq!(w.close, 104.0);
}
