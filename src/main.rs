use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use financial_calendar::config::AppConfig;
use financial_calendar::generator::generate_series;
use financial_calendar::instruments;
use financial_calendar::session::CalendarSession;
use financial_calendar::text::{render_grid, render_periods};
use financial_calendar::tui;
use financial_calendar::types::{TimeFrame, ViewMode};
use financial_calendar::web;

#[derive(Parser)]
#[command(name = "financial-calendar", about = "Month-grid calendar of daily market metrics")]
struct Cli {
    /// Run mode: tui, web, or headless
    #[arg(long, default_value = "tui")]
    mode: String,

    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Web server port (web mode only)
    #[arg(long)]
    port: Option<u16>,

    /// Instrument symbol, e.g. BTC/USD, AAPL, EUR/USD
    #[arg(long)]
    instrument: Option<String>,

    /// Aggregation: daily, weekly, or monthly
    #[arg(long)]
    timeframe: Option<TimeFrame>,

    /// Cell emphasis: all, volatility, liquidity, or performance
    #[arg(long)]
    view: Option<ViewMode>,

    /// Displayed year (defaults to the current year)
    #[arg(long)]
    year: Option<i32>,

    /// Displayed month, 1-12 (defaults to the current month)
    #[arg(long)]
    month: Option<u32>,

    /// Seed for reproducible synthetic data
    #[arg(long)]
    seed: Option<u64>,

    /// Months of synthetic history to generate
    #[arg(long)]
    history_months: Option<u32>,

    /// Write logs to this file (TUI mode discards logs otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<AppConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(instrument) = self.instrument {
            config.instrument = instrument;
        }
        if let Some(tf) = self.timeframe {
            config.time_frame = tf;
        }
        if let Some(view) = self.view {
            config.view_mode = view;
        }
        if let Some(year) = self.year {
            config.year = Some(year);
        }
        if let Some(month) = self.month {
            config.month = Some(month);
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(months) = self.history_months {
            config.history_months = months;
        }
        if let Some(path) = self.log_file {
            config.log_file = Some(path);
        }
        Ok(config)
    }
}

fn init_logging(config: &AppConfig, mode: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match (&config.log_file, mode) {
        (Some(path), _) => {
            let file = std::fs::File::create(path)?;
            builder.with_ansi(false).with_writer(Arc::new(file)).init();
        }
        // the TUI owns the terminal
        (None, "tui") => builder.with_writer(std::io::sink).init(),
        (None, _) => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mode = cli.mode.clone();
    let config = cli.into_config()?;
    init_logging(&config, &mode)?;

    match mode.as_str() {
        "tui" => tui::run(&config)?,
        "web" => web::run(&config).await?,
        "headless" => run_headless(&config)?,
        other => eprintln!("Unknown mode: {other}. Use --mode tui|web|headless"),
    }

    Ok(())
}

fn run_headless(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let today = Local::now().date_naive();
    let instrument = instruments::find(&config.instrument)?;
    let series = generate_series(instrument, config.seed, today, config.history_months);
    info!(symbol = instrument.symbol, points = series.len(), "loaded series");

    let mut session = CalendarSession::new(instrument, series, today)
        .with_time_frame(config.time_frame)
        .with_view_mode(config.view_mode);
    if config.year.is_some() || config.month.is_some() {
        let (year, month0) = session.displayed_month();
        let month0 = config.month.map_or(month0, |m| m as i32 - 1);
        session.show_month(config.year.unwrap_or(year), month0)?;
    }

    println!("=== financial-calendar (headless) ===");
    println!(
        "Instrument: {} ({}), Frame: {}, View: {}",
        instrument.symbol,
        instrument.name,
        session.time_frame(),
        session.view_mode()
    );
    println!();

    let grid = session.grid()?;
    print!("{}", render_grid(&grid, session.view_mode()));
    println!();

    print!("{}", render_periods(session.periods()));
    println!();

    if let Some(summary) = session.month_summary() {
        println!("Month {}: return {:+.2}%, volume {:.0}", summary.date, summary.performance, summary.volume);
    }
    if let Some(stats) = session.statistics() {
        println!(
            "  Periods: {}  Avg close: {:.2}  Range: {:.2} - {:.2}  Avg vol: {:.2}%",
            stats.count, stats.avg_price, stats.min_price, stats.max_price, stats.avg_volatility
        );
    }
    Ok(())
}
