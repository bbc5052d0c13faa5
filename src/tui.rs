use std::io;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Terminal;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::format::{format_currency, format_percentage, format_volume};
use crate::generator::{generate_series, regeneration_seed};
use crate::grid::{CalendarDay, CalendarGrid};
use crate::instruments::{self, Instrument};
use crate::levels::{LiquidityLevel, PerformanceTone, VolatilityLevel};
use crate::session::CalendarSession;
use crate::text::{cell_metric, month_title, WEEKDAY_NAMES};
use crate::types::{FinancialDataPoint, TimeFrame};

struct App {
    session: CalendarSession,
    seed: Option<u64>,
    history_months: u32,
    regenerations: u64,
    status: String,
    should_quit: bool,
}

impl App {
    fn new(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let today = Local::now().date_naive();
        let instrument = instruments::find(&config.instrument)?;
        let series = generate_series(instrument, config.seed, today, config.history_months);
        let mut session = CalendarSession::new(instrument, series, today)
            .with_time_frame(config.time_frame)
            .with_view_mode(config.view_mode);
        if config.year.is_some() || config.month.is_some() {
            let (year, month0) = session.displayed_month();
            let month0 = config.month.map_or(month0, |m| m as i32 - 1);
            session.show_month(config.year.unwrap_or(year), month0)?;
        }
        Ok(Self {
            session,
            seed: config.seed,
            history_months: config.history_months,
            regenerations: 0,
            status: String::from("ready"),
            should_quit: false,
        })
    }

    fn series_for(&self, instrument: &'static Instrument) -> Vec<FinancialDataPoint> {
        let seed = regeneration_seed(self.seed, self.regenerations);
        generate_series(instrument, seed, self.session.today(), self.history_months)
    }

    fn handle_key(&mut self, code: KeyCode) {
        let result = match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                Ok(())
            }
            KeyCode::Left => self.session.move_selection(-1).map(|_| ()),
            KeyCode::Right => self.session.move_selection(1).map(|_| ()),
            KeyCode::Up => self.session.move_selection(-7).map(|_| ()),
            KeyCode::Down => self.session.move_selection(7).map(|_| ()),
            KeyCode::Char('n') | KeyCode::PageDown => self.session.next_month(),
            KeyCode::Char('p') | KeyCode::PageUp => self.session.prev_month(),
            KeyCode::Char('g') => {
                self.session.go_to_today();
                Ok(())
            }
            KeyCode::Char('t') => {
                let tf = self.session.cycle_time_frame();
                self.status = format!("time frame: {tf}");
                Ok(())
            }
            KeyCode::Char('v') => {
                let vm = self.session.cycle_view_mode();
                self.status = format!("view: {vm}");
                Ok(())
            }
            KeyCode::Char('i') => {
                let next = instruments::next_after(self.session.instrument().symbol);
                let series = self.series_for(next);
                self.session.set_instrument(next, series);
                self.status = format!("instrument: {}", next.symbol);
                Ok(())
            }
            KeyCode::Char('r') => {
                self.regenerations += 1;
                let series = self.series_for(self.session.instrument());
                self.session.replace_series(series);
                self.status = String::from("data regenerated");
                Ok(())
            }
            KeyCode::Char('e') => self.export(),
            _ => Ok(()),
        };
        if let Err(e) = result {
            warn!(error = %e, "key action failed");
            self.status = e.to_string();
        }
    }

    fn export(&mut self) -> crate::error::Result<()> {
        let json = self.session.export_json()?;
        let name = self.session.export_file_name();
        std::fs::write(&name, json)?;
        info!(file = %name, "exported calendar data");
        self.status = format!("exported {name}");
        Ok(())
    }
}

pub fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    while !app.should_quit {
        let grid = app.session.grid()?;
        terminal.draw(|f| draw(f, app, &grid))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }

        // keep "today" right if the app stays open past midnight
        let today = Local::now().date_naive();
        if today != app.session.today() {
            app.session.set_today(today);
        }
    }
    Ok(())
}

fn draw(f: &mut ratatui::Frame, app: &App, grid: &CalendarGrid) {
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(16),   // calendar + side panel
            Constraint::Length(3), // help / status
        ])
        .split(size);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(chunks[1]);

    draw_header(f, app, grid, chunks[0]);
    draw_calendar(f, app, grid, body[0]);
    draw_side_panel(f, app, body[1]);
    draw_footer(f, app, chunks[2]);
}

fn draw_header(f: &mut ratatui::Frame, app: &App, grid: &CalendarGrid, area: Rect) {
    let inst = app.session.instrument();
    let header = vec![
        Span::styled(" financial-calendar ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(" | "),
        Span::styled(format!("{} ({})", inst.symbol, inst.name), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::raw(" | "),
        Span::styled(month_title(grid.year, grid.month), Style::default().fg(Color::Yellow)),
        Span::raw(" | "),
        Span::styled(format!("Frame: {}", app.session.time_frame()), Style::default().fg(Color::Green)),
        Span::raw(" | "),
        Span::styled(format!("View: {}", app.session.view_mode()), Style::default().fg(Color::Blue)),
    ];
    let p = Paragraph::new(Line::from(header))
        .block(Block::default().borders(Borders::ALL).title(" Calendar "));
    f.render_widget(p, area);
}

fn day_style(day: &CalendarDay, app: &App) -> Style {
    let mut style = Style::default();
    if let Some(data) = &day.financial_data {
        if app.session.view_mode().shows_volatility() {
            style = style.bg(volatility_color(VolatilityLevel::of(data.volatility)));
        }
        style = style.fg(tone_color(PerformanceTone::of(data.performance)));
    }
    if day.is_outside_month {
        style = style.fg(Color::DarkGray);
    } else if day.is_weekend && day.financial_data.is_none() {
        style = style.fg(Color::Gray);
    }
    if day.is_today {
        style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    }
    if day.is_selected {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}

fn draw_calendar(f: &mut ratatui::Frame, app: &App, grid: &CalendarGrid, area: Rect) {
    let view_mode = app.session.view_mode();
    let rows: Vec<Row> = grid
        .weeks
        .iter()
        .map(|week| {
            let cells: Vec<Cell> = week
                .iter()
                .map(|day| {
                    let text = Text::from(vec![
                        Line::from(format!("{}", day.date.format("%-d"))),
                        Line::from(cell_metric(day, view_mode)),
                    ]);
                    Cell::from(text).style(day_style(day, app))
                })
                .collect();
            Row::new(cells).height(2)
        })
        .collect();

    let table = Table::new(rows, [Constraint::Ratio(1, 7); 7])
        .header(
            Row::new(WEEKDAY_NAMES.to_vec())
                .style(Style::default().add_modifier(Modifier::BOLD).fg(Color::White)),
        )
        .column_spacing(1)
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", month_title(grid.year, grid.month))));

    f.render_widget(table, area);
}

fn draw_side_panel(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(12), Constraint::Length(9)])
        .split(area);

    let title = match (app.session.selected(), app.session.time_frame()) {
        (Some(date), TimeFrame::Daily) => format!(" {} ", date.format("%A, %B %-d, %Y")),
        (Some(_), tf) => format!(" {} period ", tf),
        (None, _) => String::from(" Select a date "),
    };

    let detail_text = match app.session.selected_detail() {
        Some(d) => vec![
            metric_line("Period", d.date.clone(), Color::White),
            metric_line("Open", format_currency(d.open), Color::White),
            metric_line("High", format_currency(d.high), Color::Green),
            metric_line("Low", format_currency(d.low), Color::Red),
            metric_line("Close", format_currency(d.close), Color::White),
            metric_line("Return", format_percentage(d.performance), tone_color(PerformanceTone::of(d.performance))),
            metric_line("Volume", format_volume(d.volume), Color::Cyan),
            metric_line(
                "Volatility",
                format!("{:.2}% ({})", d.volatility, VolatilityLevel::of(d.volatility).label()),
                volatility_color(VolatilityLevel::of(d.volatility)),
            ),
            metric_line(
                "Liquidity",
                format!("{:.1} ({})", d.liquidity, LiquidityLevel::of(d.liquidity).label()),
                Color::Blue,
            ),
            metric_line("MA", format_currency(d.moving_average), Color::Gray),
            metric_line("RSI", format!("{:.1}", d.rsi), Color::Gray),
            metric_line("VIX", format!("{:.1}", d.vix), Color::Gray),
        ],
        None => vec![Line::from(Span::styled(
            "  no data for this date",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    let detail = Paragraph::new(detail_text)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(detail, chunks[0]);

    let stats_text = match app.session.statistics() {
        Some(s) => vec![
            metric_line("Periods", s.count.to_string(), Color::White),
            metric_line("Avg price", format_currency(s.avg_price), Color::White),
            metric_line("Range", format!("{} - {}", format_currency(s.min_price), format_currency(s.max_price)), Color::White),
            metric_line("Avg vol", format!("{:.2}%", s.avg_volatility), Color::Yellow),
            metric_line("Max vol", format!("{:.2}%", s.max_volatility), Color::Yellow),
            metric_line("Volume", format_volume(s.total_volume), Color::Cyan),
        ],
        None => vec![Line::from("  empty series")],
    };
    let stats = Paragraph::new(stats_text)
        .block(Block::default().borders(Borders::ALL).title(" Statistics "));
    f.render_widget(stats, chunks[1]);
}

fn draw_footer(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            "q=quit  arrows=select  n/p=month  g=today  t=frame  v=view  i=instrument  r=regen  e=export",
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  | "),
        Span::styled(app.status.clone(), Style::default().fg(Color::Yellow)),
    ]);
    let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn metric_line(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<11}", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

fn volatility_color(level: VolatilityLevel) -> Color {
    match level {
        VolatilityLevel::Low => Color::Rgb(20, 60, 30),
        VolatilityLevel::Medium => Color::Rgb(70, 70, 20),
        VolatilityLevel::High => Color::Rgb(90, 50, 10),
        VolatilityLevel::Extreme => Color::Rgb(100, 20, 20),
    }
}

fn tone_color(tone: PerformanceTone) -> Color {
    match tone {
        PerformanceTone::StrongGain => Color::LightGreen,
        PerformanceTone::Gain => Color::Green,
        PerformanceTone::Flat => Color::White,
        PerformanceTone::Loss => Color::Red,
        PerformanceTone::StrongLoss => Color::LightRed,
    }
}
