use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::aggregate::performance;
use crate::instruments::Instrument;
use crate::types::{format_date_key, FinancialDataPoint};

/// Synthetic daily series for one instrument: a random walk on the close
/// with a consistent OHLC envelope around each day's move.
pub struct SeriesGenerator {
    instrument: &'static Instrument,
    rng: StdRng,
    last_close: f64,
}

impl SeriesGenerator {
    pub fn new(instrument: &'static Instrument) -> Self {
        Self::with_rng(instrument, StdRng::from_entropy())
    }

    /// Deterministic generator; the same seed yields the same series.
    pub fn seeded(instrument: &'static Instrument, seed: u64) -> Self {
        Self::with_rng(instrument, StdRng::seed_from_u64(seed))
    }

    fn with_rng(instrument: &'static Instrument, rng: StdRng) -> Self {
        Self { instrument, rng, last_close: instrument.base_price }
    }

    pub fn instrument(&self) -> &'static Instrument {
        self.instrument
    }

    pub fn last_close(&self) -> f64 {
        self.last_close
    }

    /// One point per weekday in `[start, end]`; weekends are absent.
    pub fn generate(&mut self, start: NaiveDate, end: NaiveDate) -> Vec<FinancialDataPoint> {
        let mut points = Vec::new();
        let mut current = start;
        while current <= end {
            if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                points.push(self.next_point(current));
            }
            match current.checked_add_days(Days::new(1)) {
                Some(next) => current = next,
                None => break,
            }
        }
        debug!(
            symbol = self.instrument.symbol,
            start = %start,
            end = %end,
            points = points.len(),
            "generated synthetic series"
        );
        points
    }

    /// The last `months` calendar months up to and including `today`.
    pub fn generate_recent(&mut self, today: NaiveDate, months: u32) -> Vec<FinancialDataPoint> {
        let start = today.checked_sub_months(Months::new(months)).unwrap_or(today);
        self.generate(start, today)
    }

    fn next_point(&mut self, date: NaiveDate) -> FinancialDataPoint {
        let rng = &mut self.rng;
        let prev = self.last_close;

        // 2-12% daily volatility before instrument scaling
        let volatility = (rng.gen::<f64>() * 0.1 + 0.02) * self.instrument.volatility_scale;
        let change = (rng.gen::<f64>() - 0.5) * volatility * prev;

        let open = prev;
        let close = (open + change).max(prev * 0.01);
        let high = open.max(close) + rng.gen::<f64>() * 0.02 * prev;
        let low = (open.min(close) - rng.gen::<f64>() * 0.02 * prev).max(0.0);

        let point = FinancialDataPoint {
            date: format_date_key(date),
            open,
            high,
            low,
            close,
            volume: rng.gen::<f64>() * 1_000_000.0 + 500_000.0,
            liquidity: rng.gen::<f64>() * 100.0 + 50.0,
            volatility: volatility * 100.0,
            performance: performance(open, close),
            moving_average: prev * (0.95 + rng.gen::<f64>() * 0.1),
            rsi: rng.gen::<f64>() * 100.0,
            vix: rng.gen::<f64>() * 50.0 + 10.0,
        };
        self.last_close = close;
        point
    }
}

/// Recent history for `instrument`, seeded when `seed` is set. Every
/// front-end goes through here, so one seed yields one series per instrument.
pub fn generate_series(
    instrument: &'static Instrument,
    seed: Option<u64>,
    today: NaiveDate,
    months: u32,
) -> Vec<FinancialDataPoint> {
    let mut gen = match seed {
        Some(seed) => SeriesGenerator::seeded(instrument, seed),
        None => SeriesGenerator::new(instrument),
    };
    gen.generate_recent(today, months)
}

/// Seed for the `round`-th regeneration; round 0 is the configured seed.
pub fn regeneration_seed(seed: Option<u64>, round: u64) -> Option<u64> {
    seed.map(|s| s.wrapping_add(round))
}
