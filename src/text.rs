//! Plain-text rendering for headless output.

use std::fmt::Write;

use crate::format::{format_currency, format_percentage, format_volume};
use crate::grid::{CalendarDay, CalendarGrid};
use crate::levels::{LiquidityLevel, Trend, VolatilityLevel};
use crate::types::{AggregatedPeriod, ViewMode};

pub const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

pub const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const CELL_WIDTH: usize = 10;

pub fn month_title(year: i32, month: u32) -> String {
    let name = MONTH_NAMES.get(month.saturating_sub(1) as usize).copied().unwrap_or("?");
    format!("{name} {year}")
}

/// Short cell annotation for the view mode, e.g. `↗ +1.2%` or `vol 4.1`.
pub fn cell_metric(day: &CalendarDay, view_mode: ViewMode) -> String {
    let Some(data) = &day.financial_data else {
        return String::new();
    };
    match view_mode {
        ViewMode::All | ViewMode::Performance => {
            format!("{}{:+.1}%", Trend::of(data.performance).arrow(), data.performance)
        }
        ViewMode::Volatility => {
            format!("{} {:.1}", &VolatilityLevel::of(data.volatility).label()[..3], data.volatility)
        }
        ViewMode::Liquidity => {
            let bars = LiquidityLevel::of(data.liquidity).bars();
            format!("{}{}", "█".repeat(bars), "·".repeat(3 - bars))
        }
    }
}

/// Month grid as two text lines per week: day numbers then metrics.
pub fn render_grid(grid: &CalendarGrid, view_mode: ViewMode) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:^width$}", month_title(grid.year, grid.month), width = CELL_WIDTH * 7);
    for name in WEEKDAY_NAMES {
        let _ = write!(out, "{name:<CELL_WIDTH$}");
    }
    out.push('\n');

    for week in &grid.weeks {
        for day in week {
            let marker = match (day.is_selected, day.is_today) {
                (true, _) => '*',
                (false, true) => '>',
                _ => ' ',
            };
            let label = if day.is_outside_month {
                format!("{marker}({})", day.date.format("%-d"))
            } else {
                format!("{marker}{}", day.date.format("%-d"))
            };
            let _ = write!(out, "{label:<CELL_WIDTH$}");
        }
        out.push('\n');
        for day in week {
            let metric = cell_metric(day, view_mode);
            let _ = write!(out, "{}", pad(&metric, CELL_WIDTH));
        }
        out.push('\n');
    }
    out
}

/// One row per period: key, OHLC, volume, return, volatility.
pub fn render_periods(periods: &[AggregatedPeriod]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:>12} {:>12} {:>12} {:>12} {:>9} {:>9} {:>8}",
        "PERIOD", "OPEN", "HIGH", "LOW", "CLOSE", "VOLUME", "RETURN", "VOL%"
    );
    for p in periods {
        let _ = writeln!(
            out,
            "{:<12} {:>12} {:>12} {:>12} {:>12} {:>9} {:>9} {:>8.2}",
            p.date,
            format_currency(p.open),
            format_currency(p.high),
            format_currency(p.low),
            format_currency(p.close),
            format_volume(p.volume),
            format_percentage(p.performance),
            p.volatility,
        );
    }
    out
}

// Pads by character count so multi-byte glyphs keep columns aligned.
fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    format!("{s}{}", " ".repeat(width.saturating_sub(len)))
}
