//! Terminal materialization of the tapedesk views.
//!
//! Everything above this binary is headless; this file owns the terminal,
//! the key bindings, and the refresh scheduling. View descriptions come in
//! display-ready; the only work here is turning them into widgets.

use std::{
    io,
    sync::Arc,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Sparkline, Table, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::info;

use tapedesk::{
    config::Config,
    fetch::{SnapshotFetcher, SnapshotOutcome},
    normalize,
    order::{self, OrderForm},
    sparkline::CANVAS_HEIGHT,
    state::ViewState,
    views::{
        project_detail, project_leaderboard, project_news, project_watchlist, status_line,
        DetailView, LeaderboardView, NewsView, Polarity, WatchlistView,
    },
};

struct App {
    state: ViewState,
    config: Config,
    failures: Vec<&'static str>,
    notice: Option<String>,
    search_mode: bool,
    next_seq: u64,
}

impl App {
    fn new(config: Config) -> Self {
        Self {
            state: ViewState::new(),
            config,
            failures: Vec::new(),
            notice: None,
            search_mode: false,
            next_seq: 0,
        }
    }

    /// Apply one completed refresh. Normalization and the stale-seq fence
    /// both live in the library; this just wires them together.
    fn apply(&mut self, seq: u64, outcome: SnapshotOutcome) {
        let prices = normalize::normalize_prices(&outcome.raw.prices);
        let news = normalize::normalize_news_items(&outcome.raw.news);
        let leaderboard = normalize::normalize_leaderboard_rows(&outcome.raw.leaderboard);
        let as_of = normalize::payload_as_of(&outcome.raw.prices)
            .or_else(|| normalize::payload_as_of(&outcome.raw.news));

        if self.state.replace(seq, prices, news, leaderboard, as_of) {
            self.failures = outcome.failures.clone();
            if outcome.is_total_failure() {
                self.notice = Some("refresh failed: all resources unreachable".to_string());
            }
        }
    }

    fn composer_form(&self) -> Option<OrderForm> {
        let detail = project_detail(&self.state);
        detail
            .panel
            .map(|panel| OrderForm::for_ticker(&panel.composer_ticker))
    }
}

fn init_logging() {
    // Stderr belongs to the TUI; logs go to a file instead.
    let Ok(file) = std::fs::File::create("tapedesk.log") else {
        return;
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file)
        .with_ansi(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Restore the terminal even on panic.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let config = Config::from_env();
    info!(prices = %config.prices_url, "starting tapedesk");

    let fetcher = Arc::new(SnapshotFetcher::new(&config));
    let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel::<(u64, SnapshotOutcome)>();

    let mut app = App::new(config.clone());
    let refresh_interval = config.refresh_interval;
    let mut last_refresh = Instant::now();
    spawn_refresh(next_seq(&mut app), Arc::clone(&fetcher), refresh_tx.clone());

    loop {
        // Timer-triggered refresh; idempotent, stale completions are fenced.
        if last_refresh.elapsed() >= refresh_interval {
            spawn_refresh(next_seq(&mut app), Arc::clone(&fetcher), refresh_tx.clone());
            last_refresh = Instant::now();
        }

        while let Ok((seq, outcome)) = refresh_rx.try_recv() {
            app.apply(seq, outcome);
        }

        terminal.draw(|f| render_ui(f, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if app.search_mode {
                    handle_search_key(&mut app, key.code);
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('r') => {
                        spawn_refresh(next_seq(&mut app), Arc::clone(&fetcher), refresh_tx.clone());
                        last_refresh = Instant::now();
                    }
                    KeyCode::Up | KeyCode::Char('k') => app.state.select_offset(-1),
                    KeyCode::Down | KeyCode::Char('j') => app.state.select_offset(1),
                    KeyCode::Char('s') => app.state.cycle_sector_filter(),
                    KeyCode::Char('/') => app.search_mode = true,
                    KeyCode::Char('c') => {
                        app.state.set_search_text("");
                        app.state.set_sector_filter(None);
                    }
                    KeyCode::Char('o') => {
                        if let Some(form) = app.composer_form() {
                            match order::issue_url(&form, &app.config) {
                                Ok(url) => {
                                    info!(%url, "composed order issue url");
                                    app.notice = Some(format!("order url: {url}"));
                                }
                                Err(error) => {
                                    app.notice = Some(format!("bad issue repo url: {error}"));
                                }
                            }
                        }
                    }
                    KeyCode::Char('y') => {
                        if let Some(form) = app.composer_form() {
                            let body = order::clipboard_payload(&form);
                            info!(ticker = %form.ticker, "composed order body for clipboard");
                            app.notice = Some(format!("copy manually:\n{body}"));
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn next_seq(app: &mut App) -> u64 {
    app.next_seq += 1;
    app.next_seq
}

fn spawn_refresh(
    seq: u64,
    fetcher: Arc<SnapshotFetcher>,
    tx: mpsc::UnboundedSender<(u64, SnapshotOutcome)>,
) {
    tokio::spawn(async move {
        let outcome = fetcher.fetch_all().await;
        let _ = tx.send((seq, outcome));
    });
}

fn handle_search_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc | KeyCode::Enter => app.search_mode = false,
        KeyCode::Backspace => {
            let mut text = app.state.search_text.clone();
            text.pop();
            app.state.set_search_text(text);
        }
        KeyCode::Char(c) => {
            let mut text = app.state.search_text.clone();
            text.push(c);
            app.state.set_search_text(text);
        }
        _ => {}
    }
}

fn polarity_color(polarity: Polarity) -> Color {
    match polarity {
        Polarity::Positive => Color::Green,
        Polarity::Negative => Color::Red,
        Polarity::Neutral => Color::DarkGray,
    }
}

fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(10),
            Constraint::Length(2),
        ])
        .split(f.area());

    render_status(f, app, chunks[0]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    render_watchlist(f, &project_watchlist(&app.state), main[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(main[1]);

    render_detail(f, &project_detail(&app.state), right[0]);
    render_leaderboard(f, &project_leaderboard(&app.state), right[1]);
    render_news(f, &project_news(&app.state), right[2]);

    render_footer(f, app, chunks[2]);
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let mut line = status_line(&app.state, &app.failures);
    if let Some(sector) = &app.state.sector_filter {
        line.push_str(&format!(" | sector: {sector}"));
    }
    if !app.state.search_text.is_empty() || app.search_mode {
        line.push_str(&format!(" | search: {}", app.state.search_text));
        if app.search_mode {
            line.push('_');
        }
    }
    let style = if app.failures.is_empty() {
        Style::default().fg(Color::Gray)
    } else {
        Style::default().fg(Color::Yellow)
    };
    f.render_widget(Paragraph::new(line).style(style), area);
}

fn render_watchlist(f: &mut Frame, view: &WatchlistView, area: Rect) {
    let block = Block::default().title(" WATCHLIST ").borders(Borders::ALL);

    if let Some(placeholder) = &view.placeholder {
        let paragraph = Paragraph::new(placeholder.as_str())
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(["TICKER", "COMPANY", "LAST", "CHG", "CHG%", "VOLUME"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows = view.rows.iter().map(|row| {
        let base = if row.selected {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(row.ticker.clone()).style(base.add_modifier(Modifier::BOLD)),
            Cell::from(row.company.clone()).style(base),
            Cell::from(row.last.clone()).style(base),
            Cell::from(row.change.clone()).style(base.fg(polarity_color(row.change_polarity))),
            Cell::from(row.percent_change.clone())
                .style(base.fg(polarity_color(row.percent_polarity))),
            Cell::from(row.volume.clone()).style(base),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(7),
            Constraint::Min(12),
            Constraint::Length(9),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(11),
        ],
    )
    .header(header)
    .block(block);

    f.render_widget(table, area);
}

fn render_detail(f: &mut Frame, view: &DetailView, area: Rect) {
    let block = Block::default().title(" DETAIL ").borders(Borders::ALL);

    let Some(panel) = &view.panel else {
        let text = view.placeholder.as_deref().unwrap_or_default();
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(block.inner(area));
    f.render_widget(block, area);

    let change_style = Style::default().fg(polarity_color(panel.change_polarity));
    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{} ", panel.ticker),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("{}  {}", panel.company, panel.sector)),
        ]),
        Line::from(vec![
            Span::raw(format!("last {}  ", panel.last)),
            Span::styled(format!("{} ({})", panel.change, panel.percent_change), change_style),
            Span::raw(format!("  vol {}", panel.volume)),
        ]),
        Line::from(vec![
            Span::styled(
                format!("{}  {}  {}", panel.timestamp, panel.regime, panel.macro_headline),
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(Span::styled(
            format!("order: {} (o: issue url, y: copy body)", panel.composer_ticker),
            Style::default().fg(Color::Cyan),
        )),
    ];
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner[0]);

    // Flip the y-down geometry back into the bar heights the widget expects.
    let bars: Vec<u64> = panel
        .spark
        .points
        .iter()
        .map(|&(_, y)| (CANVAS_HEIGHT - y) as u64)
        .collect();
    let spark = Sparkline::default()
        .data(&bars)
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(spark, inner[1]);
}

fn render_leaderboard(f: &mut Frame, view: &LeaderboardView, area: Rect) {
    let block = Block::default().title(" LEADERBOARD ").borders(Borders::ALL);

    if let Some(placeholder) = &view.placeholder {
        let paragraph = Paragraph::new(placeholder.as_str())
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(["#", "TEAM", "NAV", "CASH", "REALIZED"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    let rows = view.rows.iter().map(|row| {
        Row::new(vec![
            Cell::from(row.rank.clone()),
            Cell::from(row.team.clone()),
            Cell::from(row.nav.clone()),
            Cell::from(row.cash.clone()),
            Cell::from(row.realized_pnl.clone())
                .style(Style::default().fg(polarity_color(row.pnl_polarity))),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(block);

    f.render_widget(table, area);
}

fn render_news(f: &mut Frame, view: &NewsView, area: Rect) {
    let block = Block::default().title(" NEWS ").borders(Borders::ALL);

    if let Some(placeholder) = &view.placeholder {
        let paragraph = Paragraph::new(placeholder.as_str())
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let lines: Vec<Line> = view
        .lines
        .iter()
        .map(|item| {
            Line::from(vec![
                Span::styled(
                    format!("{} ", item.timestamp),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{:<5} ", item.ticker),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    item.headline.clone(),
                    Style::default().fg(polarity_color(item.sentiment)),
                ),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let keys = "q quit | r refresh | j/k select | s sector | / search | c clear | o order url | y copy body";
    let mut lines = vec![Line::from(Span::styled(
        keys,
        Style::default().fg(Color::DarkGray),
    ))];
    if let Some(notice) = &app.notice {
        // Only the first line fits the footer; the log has the full text.
        let first = notice.lines().next().unwrap_or_default();
        lines.insert(
            0,
            Line::from(Span::styled(
                first.to_string(),
                Style::default().fg(Color::Cyan),
            )),
        );
    }
    f.render_widget(Paragraph::new(lines), area);
}
