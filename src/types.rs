use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

// ── Series records ──

/// One trading day of market data, keyed by an ISO calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialDataPoint {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub liquidity: f64,
    pub volatility: f64,
    pub performance: f64,
    pub moving_average: f64,
    pub rsi: f64,
    pub vix: f64,
}

/// Bucketed summary record. Same shape as a daily point; `date` holds the
/// bucket key (`YYYY-MM-DD` of the week's Sunday, or `YYYY-MM`).
pub type AggregatedPeriod = FinancialDataPoint;

impl FinancialDataPoint {
    /// Strict `YYYY-MM-DD` parse of the date key.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date_key(&self.date)
    }

    /// `low <= min(open, close) <= max(open, close) <= high`, all finite.
    pub fn is_consistent(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return false;
        }
        self.low <= self.open.min(self.close) && self.open.max(self.close) <= self.high
    }
}

pub fn format_date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses a full ISO date key. Anything else (including `YYYY-MM`) is `None`.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    if key.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Parses either a full ISO date or a `YYYY-MM` month key (first of month).
pub fn parse_bucket_key(key: &str) -> Option<NaiveDate> {
    match key.len() {
        10 => parse_date_key(key),
        7 => NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d").ok(),
        _ => None,
    }
}

// ── Selectors ──

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 3] = [TimeFrame::Daily, TimeFrame::Weekly, TimeFrame::Monthly];

    pub fn label(&self) -> &'static str {
        match self {
            TimeFrame::Daily => "daily",
            TimeFrame::Weekly => "weekly",
            TimeFrame::Monthly => "monthly",
        }
    }

    pub fn next(self) -> Self {
        match self {
            TimeFrame::Daily => TimeFrame::Weekly,
            TimeFrame::Weekly => TimeFrame::Monthly,
            TimeFrame::Monthly => TimeFrame::Daily,
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeFrame {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" | "d" => Ok(TimeFrame::Daily),
            "weekly" | "week" | "w" => Ok(TimeFrame::Weekly),
            "monthly" | "month" | "m" => Ok(TimeFrame::Monthly),
            _ => Err(CalendarError::InvalidTimeFrame { value: s.to_string() }),
        }
    }
}

/// Which metric family the calendar cells emphasise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    All,
    Volatility,
    Liquidity,
    Performance,
}

impl ViewMode {
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::All => "all",
            ViewMode::Volatility => "volatility",
            ViewMode::Liquidity => "liquidity",
            ViewMode::Performance => "performance",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ViewMode::All => ViewMode::Volatility,
            ViewMode::Volatility => ViewMode::Performance,
            ViewMode::Performance => ViewMode::Liquidity,
            ViewMode::Liquidity => ViewMode::All,
        }
    }

    pub fn shows_volatility(&self) -> bool {
        matches!(self, ViewMode::All | ViewMode::Volatility)
    }

    pub fn shows_performance(&self) -> bool {
        matches!(self, ViewMode::All | ViewMode::Performance)
    }

    pub fn shows_liquidity(&self) -> bool {
        matches!(self, ViewMode::All | ViewMode::Liquidity)
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ViewMode {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ViewMode::All),
            "volatility" | "vol" => Ok(ViewMode::Volatility),
            "liquidity" | "liq" => Ok(ViewMode::Liquidity),
            "performance" | "perf" => Ok(ViewMode::Performance),
            _ => Err(CalendarError::InvalidViewMode { value: s.to_string() }),
        }
    }
}
