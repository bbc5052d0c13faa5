pub mod aggregate;
pub mod config;
pub mod error;
pub mod format;
pub mod generator;
pub mod grid;
pub mod instruments;
pub mod levels;
pub mod session;
pub mod stats;
pub mod text;
pub mod tui;
pub mod types;
pub mod web;

pub use aggregate::aggregate;
pub use error::{CalendarError, Result};
pub use grid::{build_grid, build_grid_today, CalendarDay, CalendarGrid};
pub use types::{AggregatedPeriod, FinancialDataPoint, TimeFrame, ViewMode};
