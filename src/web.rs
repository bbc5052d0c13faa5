use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::aggregate::{aggregate, period_containing};
use crate::config::AppConfig;
use crate::error::CalendarError;
use crate::generator::generate_series;
use crate::grid::{build_grid, CalendarGrid};
use crate::instruments::{self, Instrument, INSTRUMENTS};
use crate::stats::SeriesStatistics;
use crate::types::{parse_date_key, AggregatedPeriod, FinancialDataPoint, TimeFrame};

/// Daily series per instrument symbol, generated once at startup.
pub struct AppState {
    pub series: HashMap<&'static str, Vec<FinancialDataPoint>>,
    pub today: NaiveDate,
}

impl AppState {
    pub fn generate(config: &AppConfig, today: NaiveDate) -> Self {
        let series = INSTRUMENTS
            .iter()
            .map(|inst| (inst.symbol, generate_series(inst, config.seed, today, config.history_months)))
            .collect();
        Self { series, today }
    }

    fn series_for(&self, instrument: &Instrument) -> &[FinancialDataPoint] {
        self.series.get(instrument.symbol).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarQuery {
    pub instrument: Option<String>,
    pub year: Option<i32>,
    /// 1-12
    pub month: Option<i32>,
    pub timeframe: Option<String>,
    pub selected: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PeriodsQuery {
    pub instrument: Option<String>,
    pub timeframe: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CalendarResponse {
    instrument: &'static Instrument,
    time_frame: TimeFrame,
    grid: CalendarGrid,
    selected_detail: Option<AggregatedPeriod>,
    statistics: Option<SeriesStatistics>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PeriodsResponse {
    instrument: &'static str,
    time_frame: TimeFrame,
    periods: Vec<AggregatedPeriod>,
}

/// JSON error body with a status derived from the error kind.
pub struct ApiError(CalendarError);

impl From<CalendarError> for ApiError {
    fn from(e: CalendarError) -> Self {
        Self(e)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(CalendarError::InvalidQuery { reason: rejection.body_text() })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            CalendarError::UnknownInstrument { .. } => StatusCode::NOT_FOUND,
            CalendarError::Io(_) | CalendarError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
        warn!(status = status.as_u16(), error = %self.0, "request failed");
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/instruments", get(list_instruments))
        .route("/api/calendar", get(calendar))
        .route("/api/periods", get(periods))
        .fallback_service(ServeDir::new("static"))
        .with_state(state)
}

pub async fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::generate(config, Local::now().date_naive()));
    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    info!(%addr, "serving calendar API");
    println!("Dashboard at http://localhost:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn list_instruments() -> Json<&'static [Instrument]> {
    Json(INSTRUMENTS)
}

async fn calendar(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CalendarQuery>, QueryRejection>,
) -> Result<Json<CalendarResponse>, ApiError> {
    let Query(q) = query?;
    let instrument = resolve_instrument(q.instrument.as_deref())?;
    let time_frame = resolve_time_frame(q.timeframe.as_deref())?;
    let selected = match q.selected.as_deref() {
        Some(raw) => Some(parse_date_key(raw).ok_or_else(|| CalendarError::InvalidDate { value: raw.to_string() })?),
        None => None,
    };
    let year = q.year.unwrap_or(state.today.year());
    let month0 = q.month.map(|m| m - 1).unwrap_or(state.today.month0() as i32);

    let series = state.series_for(instrument);
    let periods = aggregate(series, time_frame);
    let grid = match time_frame {
        TimeFrame::Weekly => build_grid(year, month0, &periods, selected, state.today)?,
        TimeFrame::Daily | TimeFrame::Monthly => build_grid(year, month0, series, selected, state.today)?,
    };
    let selected_detail = selected.and_then(|date| period_containing(&periods, date, time_frame).cloned());

    Ok(Json(CalendarResponse {
        instrument,
        time_frame,
        grid,
        selected_detail,
        statistics: SeriesStatistics::compute(&periods),
    }))
}

async fn periods(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PeriodsQuery>, QueryRejection>,
) -> Result<Json<PeriodsResponse>, ApiError> {
    let Query(q) = query?;
    let instrument = resolve_instrument(q.instrument.as_deref())?;
    let time_frame = resolve_time_frame(q.timeframe.as_deref())?;
    Ok(Json(PeriodsResponse {
        instrument: instrument.symbol,
        time_frame,
        periods: aggregate(state.series_for(instrument), time_frame),
    }))
}

fn resolve_instrument(symbol: Option<&str>) -> Result<&'static Instrument, CalendarError> {
    match symbol {
        Some(s) => instruments::find(s),
        None => Ok(instruments::default_instrument()),
    }
}

fn resolve_time_frame(raw: Option<&str>) -> Result<TimeFrame, CalendarError> {
    raw.map(str::parse::<TimeFrame>).transpose().map(Option::unwrap_or_default)
}
