use thiserror::Error;

/// Errors surfaced by the calendar library.
///
/// The grid builder and aggregator are total over well-formed input; these
/// variants cover caller mistakes at the edges (unknown names, dates outside
/// the representable range) and I/O in the front-ends.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("date out of range: year {year}, month {month}")]
    DateOutOfRange { year: i32, month: i32 },

    #[error("invalid time frame '{value}', expected one of daily, weekly, monthly")]
    InvalidTimeFrame { value: String },

    #[error("invalid view mode '{value}', expected one of all, volatility, liquidity, performance")]
    InvalidViewMode { value: String },

    #[error("unknown instrument '{symbol}'")]
    UnknownInstrument { symbol: String },

    #[error("invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("nothing to export: no selection and an empty series")]
    NothingToExport,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CalendarError>;
