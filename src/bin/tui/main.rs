mod app;

use std::io;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};

use app::{format_stat_days, recovery_speed, AppState, Pane, Speed};
use drawdown_recovery::analyzer::analyze;
use drawdown_recovery::config::Config;
use drawdown_recovery::error::Result;
use drawdown_recovery::fetcher::fetch_series;
use drawdown_recovery::input::{parse_threshold, prompt_threshold, prompt_ticker};
use drawdown_recovery::report::{format_date, format_price, RECOVERED_COLUMNS, UNRECOVERED_COLUMNS};
use drawdown_recovery::types::RecoveryRecord;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// `tui [TICKER] [THRESHOLD]`. Arguments not given on the command line are prompted for.
#[tokio::main]
async fn main() -> io::Result<()> {
    let mut app = match load().await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn load() -> Result<AppState> {
    let cfg = Config::from_env()?;

    let mut args = std::env::args().skip(1);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let ticker = match args.next() {
        Some(t) => t,
        None => prompt_ticker(&mut stdin.lock(), &mut stdout)?,
    };
    let threshold = match args.next() {
        Some(t) => parse_threshold(&t)?,
        None => prompt_threshold(&mut stdin.lock(), &mut stdout)?,
    };

    println!("Fetching {ticker} daily bars {} → {} ...", cfg.start_date, cfg.end_date);
    let series = fetch_series(&cfg, &ticker).await?;
    let records = analyze(&series, f64::from(threshold));

    Ok(AppState::new(ticker, threshold, (cfg.start_date, cfg.end_date), &records))
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => app.toggle_focus(),
                KeyCode::Down | KeyCode::Char('j') => app.select_next(),
                KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
                _ => {}
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &mut AppState) {
    let area = f.area();

    // Outer vertical split: header | body | summary | footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // body
            Constraint::Length(3), // summary
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_body(f, app, chunks[1]);
    render_summary(f, app, chunks[2]);
    render_footer(f, chunks[3]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let title_spans = vec![
        Span::styled(
            format!(" {}  ", app.ticker),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{} → {}", format_date(app.start_date), format_date(app.end_date)),
            Style::default().fg(Color::White),
        ),
        Span::raw("  │  "),
        Span::styled(
            format!("drops of {}% ± 2", app.threshold),
            Style::default().fg(Color::White),
        ),
        Span::raw("  │  "),
        Span::styled(
            format!("{} recovered", app.summary.recovered),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  │  "),
        Span::styled(
            format!("{} not recovered", app.summary.unrecovered),
            Style::default().fg(Color::Red),
        ),
    ];

    let paragraph = Paragraph::new(Line::from(title_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(paragraph, area);
}

fn render_body(f: &mut Frame, app: &mut AppState, area: Rect) {
    if app.is_empty() {
        let msg = Paragraph::new(format!(
            "No drops of {}% or more found in the given time period.",
            app.threshold
        ))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(msg, area);
        return;
    }

    let halves = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let focus = app.focus;
    render_records_table(
        f,
        " UNRECOVERED DROPS ",
        &app.unrecovered,
        false,
        focus == Pane::Unrecovered,
        &mut app.unrecovered_state,
        halves[0],
    );
    render_records_table(
        f,
        " RECOVERED DROPS ",
        &app.recovered,
        true,
        focus == Pane::Recovered,
        &mut app.recovered_state,
        halves[1],
    );
}

fn render_records_table(
    f: &mut Frame,
    title: &str,
    records: &[RecoveryRecord],
    recovered: bool,
    focused: bool,
    state: &mut TableState,
    area: Rect,
) {
    let columns = if recovered { &RECOVERED_COLUMNS } else { &UNRECOVERED_COLUMNS };

    let header_cells = columns
        .iter()
        .map(|c| Cell::from(c.header).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = records
        .iter()
        .map(|r| {
            let last_color = match r.days_to_recover.map(recovery_speed) {
                Some(Speed::Fast) => Color::Green,
                Some(Speed::Moderate) => Color::Yellow,
                Some(Speed::Slow) => Color::Red,
                None if r.recovery_pct >= 0.0 => Color::LightGreen,
                None => Color::Red,
            };
            let mut cells: Vec<Cell> = columns.iter().map(|c| Cell::from((c.cell)(r))).collect();
            if let Some(last) = cells.pop() {
                cells.push(last.style(Style::default().fg(last_color)));
            }
            Row::new(cells)
        })
        .collect();

    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(22),
            Constraint::Length(7),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(Span::styled(
                format!("{title}({}) ", records.len()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    )
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    f.render_stateful_widget(table, area, state);
}

fn render_summary(f: &mut Frame, app: &AppState, area: Rect) {
    let stats = app.summary.stats;
    let line = Line::from(vec![
        Span::styled(
            format!(" Total {}% drops: {}", app.threshold, app.summary.total),
            Style::default().fg(Color::White),
        ),
        Span::raw("  │  "),
        Span::raw(format!(
            "avg recovery: {}",
            format_stat_days(stats.map(|s| s.average))
        )),
        Span::raw("  │  "),
        Span::raw(format!(
            "fastest: {}",
            format_stat_days(stats.map(|s| s.fastest as f64))
        )),
        Span::raw("  │  "),
        Span::raw(format!(
            "longest: {}",
            format_stat_days(stats.map(|s| s.longest as f64))
        )),
        Span::raw("  │  "),
        Span::styled(
            format!(
                "latest close: {}",
                app.unrecovered
                    .first()
                    .map_or("—".to_string(), |r| format_price(r.resolution_price))
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" SUMMARY "),
    );
    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled("[tab] ", Style::default().fg(Color::Yellow)),
        Span::raw("switch table  "),
        Span::styled("[↑↓ / j k] ", Style::default().fg(Color::Yellow)),
        Span::raw("scroll"),
    ]);
    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}
