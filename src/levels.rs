use serde::Serialize;

// ── Threshold tables ──
// Each entry is (exclusive upper bound, level); values past the last bound
// fall into the table's top level.

const VOLATILITY_TABLE: &[(f64, VolatilityLevel)] = &[
    (2.0, VolatilityLevel::Low),
    (5.0, VolatilityLevel::Medium),
    (10.0, VolatilityLevel::High),
];

const LIQUIDITY_TABLE: &[(f64, LiquidityLevel)] = &[
    (40.0, LiquidityLevel::Low),
    (80.0, LiquidityLevel::Medium),
];

// Gain bands are (exclusive lower bound, level), highest first; loss bands
// are (exclusive upper bound, level), lowest first. Anything in between is
// flat.

const GAIN_TABLE: &[(f64, PerformanceTone)] = &[
    (2.0, PerformanceTone::StrongGain),
    (0.0, PerformanceTone::Gain),
];

const LOSS_TABLE: &[(f64, PerformanceTone)] = &[
    (-2.0, PerformanceTone::StrongLoss),
    (0.0, PerformanceTone::Loss),
];

const UP_TABLE: &[(f64, Trend)] = &[(0.5, Trend::Up)];

const DOWN_TABLE: &[(f64, Trend)] = &[(-0.5, Trend::Down)];

/// Walks an ascending threshold table and returns the first level whose
/// bound is above `value`.
pub fn classify<T: Copy>(value: f64, table: &[(f64, T)], top: T) -> T {
    table
        .iter()
        .find(|(bound, _)| value < *bound)
        .map(|(_, level)| *level)
        .unwrap_or(top)
}

/// Walks a descending threshold table and returns the first level whose
/// bound is below `value`.
pub fn classify_above<T: Copy>(value: f64, table: &[(f64, T)], bottom: T) -> T {
    table
        .iter()
        .find(|(bound, _)| value > *bound)
        .map(|(_, level)| *level)
        .unwrap_or(bottom)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityLevel {
    Low,
    Medium,
    High,
    Extreme,
}

impl VolatilityLevel {
    pub fn of(volatility: f64) -> Self {
        classify(volatility, VOLATILITY_TABLE, VolatilityLevel::Extreme)
    }

    pub fn label(&self) -> &'static str {
        match self {
            VolatilityLevel::Low => "low",
            VolatilityLevel::Medium => "medium",
            VolatilityLevel::High => "high",
            VolatilityLevel::Extreme => "extreme",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LiquidityLevel {
    Low,
    Medium,
    High,
}

impl LiquidityLevel {
    pub fn of(liquidity: f64) -> Self {
        classify(liquidity, LIQUIDITY_TABLE, LiquidityLevel::High)
    }

    pub fn label(&self) -> &'static str {
        match self {
            LiquidityLevel::Low => "low",
            LiquidityLevel::Medium => "medium",
            LiquidityLevel::High => "high",
        }
    }

    /// Filled bars out of three, for compact liquidity meters.
    pub fn bars(&self) -> usize {
        match self {
            LiquidityLevel::Low => 1,
            LiquidityLevel::Medium => 2,
            LiquidityLevel::High => 3,
        }
    }
}

/// Colour band for a period return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PerformanceTone {
    StrongGain,
    Gain,
    Flat,
    Loss,
    StrongLoss,
}

impl PerformanceTone {
    pub fn of(performance: f64) -> Self {
        let not_gain = classify(performance, LOSS_TABLE, PerformanceTone::Flat);
        classify_above(performance, GAIN_TABLE, not_gain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Flat,
    Down,
}

impl Trend {
    pub fn of(performance: f64) -> Self {
        classify_above(performance, UP_TABLE, classify(performance, DOWN_TABLE, Trend::Flat))
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "↗",
            Trend::Flat => "→",
            Trend::Down => "↘",
        }
    }
}
