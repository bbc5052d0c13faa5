use serde::Serialize;

use crate::types::FinancialDataPoint;

/// Summary figures over a displayed series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStatistics {
    pub count: usize,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_volatility: f64,
    pub max_volatility: f64,
    pub total_volume: f64,
}

impl SeriesStatistics {
    /// Close-price and volatility summary; `None` for an empty series.
    pub fn compute(points: &[FinancialDataPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        Some(Self {
            count: points.len(),
            avg_price: points.iter().map(|p| p.close).sum::<f64>() / n,
            min_price: points.iter().map(|p| p.close).fold(f64::INFINITY, f64::min),
            max_price: points.iter().map(|p| p.close).fold(f64::NEG_INFINITY, f64::max),
            avg_volatility: points.iter().map(|p| p.volatility).sum::<f64>() / n,
            max_volatility: points.iter().map(|p| p.volatility).fold(f64::NEG_INFINITY, f64::max),
            total_volume: points.iter().map(|p| p.volume).sum(),
        })
    }
}
