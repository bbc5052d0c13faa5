use serde::Serialize;

use crate::error::{CalendarError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Crypto,
    Stock,
    #[serde(rename = "ETF")]
    Etf,
    Forex,
    Commodities,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Crypto => "Crypto",
            Category::Stock => "Stock",
            Category::Etf => "ETF",
            Category::Forex => "Forex",
            Category::Commodities => "Commodities",
        }
    }
}

/// A tradable symbol the calendar can display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub symbol: &'static str,
    pub name: &'static str,
    pub category: Category,
    /// Starting price for the synthetic series.
    pub base_price: f64,
    /// Multiplier applied to the generator's daily volatility draw.
    pub volatility_scale: f64,
}

pub const DEFAULT_SYMBOL: &str = "BTC/USD";

pub const INSTRUMENTS: &[Instrument] = &[
    Instrument { symbol: "BTC/USD", name: "Bitcoin",      category: Category::Crypto,      base_price: 50_000.0, volatility_scale: 1.0 },
    Instrument { symbol: "ETH/USD", name: "Ethereum",     category: Category::Crypto,      base_price: 3_000.0,  volatility_scale: 1.0 },
    Instrument { symbol: "AAPL",    name: "Apple Inc.",   category: Category::Stock,       base_price: 190.0,    volatility_scale: 0.4 },
    Instrument { symbol: "TSLA",    name: "Tesla Inc.",   category: Category::Stock,       base_price: 250.0,    volatility_scale: 0.7 },
    Instrument { symbol: "SPY",     name: "S&P 500 ETF",  category: Category::Etf,         base_price: 510.0,    volatility_scale: 0.25 },
    Instrument { symbol: "EUR/USD", name: "Euro/Dollar",  category: Category::Forex,       base_price: 1.08,     volatility_scale: 0.1 },
    Instrument { symbol: "GBP/USD", name: "Pound/Dollar", category: Category::Forex,       base_price: 1.27,     volatility_scale: 0.1 },
    Instrument { symbol: "GOLD",    name: "Gold Futures", category: Category::Commodities, base_price: 2_300.0,  volatility_scale: 0.3 },
];

/// Case-insensitive lookup by symbol.
pub fn find(symbol: &str) -> Result<&'static Instrument> {
    INSTRUMENTS
        .iter()
        .find(|inst| inst.symbol.eq_ignore_ascii_case(symbol.trim()))
        .ok_or_else(|| CalendarError::UnknownInstrument { symbol: symbol.to_string() })
}

pub fn default_instrument() -> &'static Instrument {
    &INSTRUMENTS[0]
}

/// The instrument after `symbol` in catalogue order, wrapping around.
pub fn next_after(symbol: &str) -> &'static Instrument {
    let idx = INSTRUMENTS
        .iter()
        .position(|inst| inst.symbol == symbol)
        .map(|i| (i + 1) % INSTRUMENTS.len())
        .unwrap_or(0);
    &INSTRUMENTS[idx]
}
