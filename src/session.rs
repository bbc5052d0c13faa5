//! Stateful owner of what the calendar is showing: instrument, raw daily
//! series, selection, displayed month, time frame and view mode. The grid
//! and period list are recomputed from this state on demand.

use chrono::{Datelike, Days, NaiveDate};
use tracing::debug;

use crate::aggregate::{aggregate, bucket_key, period_containing};
use crate::error::{CalendarError, Result};
use crate::grid::{build_grid, normalize_month, CalendarGrid};
use crate::instruments::Instrument;
use crate::stats::SeriesStatistics;
use crate::types::{format_date_key, AggregatedPeriod, FinancialDataPoint, TimeFrame, ViewMode};

pub struct CalendarSession {
    instrument: &'static Instrument,
    series: Vec<FinancialDataPoint>,
    /// `series` aggregated at `time_frame`; rebuilt whenever either changes.
    periods: Vec<AggregatedPeriod>,
    time_frame: TimeFrame,
    view_mode: ViewMode,
    year: i32,
    /// Zero-based, always within 0..=11.
    month0: i32,
    selected: Option<NaiveDate>,
    today: NaiveDate,
}

impl CalendarSession {
    /// Starts on the month containing `today` with nothing selected.
    pub fn new(instrument: &'static Instrument, series: Vec<FinancialDataPoint>, today: NaiveDate) -> Self {
        let periods = aggregate(&series, TimeFrame::Daily);
        Self {
            instrument,
            series,
            periods,
            time_frame: TimeFrame::Daily,
            view_mode: ViewMode::All,
            year: today.year(),
            month0: today.month0() as i32,
            selected: None,
            today,
        }
    }

    pub fn with_time_frame(mut self, time_frame: TimeFrame) -> Self {
        self.set_time_frame(time_frame);
        self
    }

    pub fn with_view_mode(mut self, view_mode: ViewMode) -> Self {
        self.view_mode = view_mode;
        self
    }

    // ── Accessors ──

    pub fn instrument(&self) -> &'static Instrument {
        self.instrument
    }

    pub fn series(&self) -> &[FinancialDataPoint] {
        &self.series
    }

    pub fn time_frame(&self) -> TimeFrame {
        self.time_frame
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Displayed (year, zero-based month).
    pub fn displayed_month(&self) -> (i32, i32) {
        (self.year, self.month0)
    }

    // ── Navigation ──

    /// Displays `month0` of `year`, folding out-of-range months into years.
    pub fn show_month(&mut self, year: i32, month0: i32) -> Result<()> {
        let (norm_year, month) = normalize_month(year, month0)?;
        NaiveDate::from_ymd_opt(norm_year, month, 1)
            .ok_or(CalendarError::DateOutOfRange { year, month: month0 })?;
        self.year = norm_year;
        self.month0 = month as i32 - 1;
        Ok(())
    }

    pub fn next_month(&mut self) -> Result<()> {
        self.show_month(self.year, self.month0 + 1)
    }

    pub fn prev_month(&mut self) -> Result<()> {
        self.show_month(self.year, self.month0 - 1)
    }

    /// Displays the month containing today. The selection is left alone.
    pub fn go_to_today(&mut self) {
        self.year = self.today.year();
        self.month0 = self.today.month0() as i32;
    }

    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    pub fn select(&mut self, date: NaiveDate) {
        self.selected = Some(date);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Moves the selection by `days` (arrow keys: ±1 horizontally, ±7
    /// vertically), starting from today when nothing is selected. If the new
    /// date falls outside the displayed month, that month is displayed.
    pub fn move_selection(&mut self, days: i64) -> Result<NaiveDate> {
        let base = self.selected.unwrap_or(self.today);
        let step = Days::new(days.unsigned_abs());
        let moved = if days >= 0 { base.checked_add_days(step) } else { base.checked_sub_days(step) };
        let moved = moved.ok_or(CalendarError::DateOutOfRange { year: base.year(), month: base.month0() as i32 })?;

        if (moved.year(), moved.month0() as i32) != (self.year, self.month0) {
            self.year = moved.year();
            self.month0 = moved.month0() as i32;
        }
        self.selected = Some(moved);
        Ok(moved)
    }

    // ── Selectors ──

    pub fn set_time_frame(&mut self, time_frame: TimeFrame) {
        if time_frame != self.time_frame {
            self.time_frame = time_frame;
            self.refresh_periods();
        }
    }

    pub fn cycle_time_frame(&mut self) -> TimeFrame {
        self.set_time_frame(self.time_frame.next());
        self.time_frame
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.view_mode = view_mode;
    }

    pub fn cycle_view_mode(&mut self) -> ViewMode {
        self.view_mode = self.view_mode.next();
        self.view_mode
    }

    pub fn set_instrument(&mut self, instrument: &'static Instrument, series: Vec<FinancialDataPoint>) {
        debug!(symbol = instrument.symbol, points = series.len(), "switched instrument");
        self.instrument = instrument;
        self.replace_series(series);
    }

    pub fn replace_series(&mut self, series: Vec<FinancialDataPoint>) {
        self.series = series;
        self.refresh_periods();
    }

    fn refresh_periods(&mut self) {
        self.periods = aggregate(&self.series, self.time_frame);
    }

    // ── Derived views ──

    /// The series aggregated at the current time frame.
    pub fn periods(&self) -> &[AggregatedPeriod] {
        &self.periods
    }

    /// Grid for the displayed month. Daily and monthly views attach the daily
    /// points; the weekly view attaches each week's bucket to its Sunday.
    pub fn grid(&self) -> Result<CalendarGrid> {
        match self.time_frame {
            TimeFrame::Weekly => build_grid(self.year, self.month0, &self.periods, self.selected, self.today),
            TimeFrame::Daily | TimeFrame::Monthly => {
                build_grid(self.year, self.month0, &self.series, self.selected, self.today)
            }
        }
    }

    /// Record for the selected date at the current time frame: the day's own
    /// point, or the bucket containing it.
    pub fn selected_detail(&self) -> Option<AggregatedPeriod> {
        let date = self.selected?;
        match self.time_frame {
            TimeFrame::Daily => {
                let key = format_date_key(date);
                self.series.iter().find(|p| p.date == key).cloned()
            }
            TimeFrame::Weekly | TimeFrame::Monthly => {
                period_containing(&self.periods, date, self.time_frame).cloned()
            }
        }
    }

    /// Monthly bucket for the displayed month, if the series covers it.
    pub fn month_summary(&self) -> Option<AggregatedPeriod> {
        let first = NaiveDate::from_ymd_opt(self.year, self.month0 as u32 + 1, 1)?;
        let key = bucket_key(first, TimeFrame::Monthly);
        aggregate(&self.series, TimeFrame::Monthly).into_iter().find(|p| p.date == key)
    }

    pub fn statistics(&self) -> Option<SeriesStatistics> {
        SeriesStatistics::compute(&self.periods)
    }

    /// Pretty JSON of the selected record, or of the statistics when nothing
    /// with data is selected.
    pub fn export_json(&self) -> Result<String> {
        if let Some(detail) = self.selected_detail() {
            return Ok(serde_json::to_string_pretty(&detail)?);
        }
        match self.statistics() {
            Some(stats) => Ok(serde_json::to_string_pretty(&stats)?),
            None => Err(CalendarError::NothingToExport),
        }
    }

    /// `financial-data-<date>.json`, or `financial-data-summary.json`.
    pub fn export_file_name(&self) -> String {
        match self.selected {
            Some(date) => format!("financial-data-{}.json", format_date_key(date)),
            None => "financial-data-summary.json".to_string(),
        }
    }
}
