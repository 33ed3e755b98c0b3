use crate::tui::app::{fmt_count, App, Phase, RunState};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(5), // Progress
            Constraint::Length(7), // Stats
            Constraint::Min(6),    // Logs
            Constraint::Length(3), // Controls
        ])
        .split(area);

    render_header(f, chunks[0], app);
    render_progress(f, chunks[1], app);
    render_stats(f, chunks[2], app);
    render_logs(f, chunks[3], app);
    render_controls(f, chunks[4], app);
}

fn state_span(state: &RunState) -> Span<'static> {
    let (text, color) = match state {
        RunState::Running => (" RUNNING ", Color::Green),
        RunState::Paused => (" PAUSED ", Color::Yellow),
        RunState::Finished => (" FINISHED ", Color::Cyan),
        RunState::Cancelled => (" CANCELLED ", Color::Red),
        RunState::Error(_) => (" ERROR ", Color::Red),
        RunState::Idle => (" IDLE ", Color::DarkGray),
    };
    Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let window = if app.window.is_empty() {
        String::new()
    } else {
        format!(" window {}", app.window)
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" Deck Scraper ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        state_span(&app.run_state),
        Span::styled(window, Style::default().fg(Color::White)),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
    f.render_widget(header, area);
}

fn ratio(done: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { (done as f64 / total as f64).min(1.0) }
}

fn render_progress(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Progress ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Events
            Constraint::Length(1), // Decks of current event
            Constraint::Length(1), // Phase
        ])
        .split(inner);

    let events_done = match app.phase {
        Phase::Downloading => app.current_event,
        Phase::Loading | Phase::Done => app.total_events,
        Phase::Discovering => 0,
    };
    let events_gauge = Gauge::default()
        .label(format!("Events: {}/{}", events_done, app.total_events))
        .ratio(ratio(events_done, app.total_events))
        .gauge_style(Style::default().fg(Color::Cyan));
    f.render_widget(events_gauge, rows[0]);

    let decks_gauge = Gauge::default()
        .label(format!("Decks: {}/{}", app.decks_done, app.decks_total))
        .ratio(ratio(app.decks_done, app.decks_total))
        .gauge_style(Style::default().fg(Color::Green));
    f.render_widget(decks_gauge, rows[1]);

    let phase_text = match app.phase {
        Phase::Discovering => format!(
            "Phase: Discovering events (page {}, {} in window)",
            app.pages_scanned, app.events_found
        ),
        Phase::Downloading => format!("Phase: Downloading {}", app.event_name),
        Phase::Loading => "Phase: Loading database...".to_string(),
        Phase::Done => "Phase: Complete".to_string(),
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(phase_text, Style::default().fg(Color::White)))),
        rows[2],
    );
}

fn render_stats(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Stats ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let heading = |s: &'static str| {
        Line::from(Span::styled(s, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)))
    };

    let events = vec![
        heading(" Events"),
        Line::from(format!("  Published:        {}", fmt_count(app.published))),
        Line::from(format!("  Already on disk:  {}", fmt_count(app.already_published))),
        Line::from(format!("  Empty / failed:   {} / {}", fmt_count(app.empty), fmt_count(app.failed))),
    ];
    f.render_widget(Paragraph::new(events), cols[0]);

    let decks = vec![
        heading(" Decks"),
        Line::from(format!("  Saved:            {}", fmt_count(app.decks_saved))),
        Line::from(format!("  Skipped:          {}", fmt_count(app.decks_failed))),
        Line::from(format!(
            "  Loaded into DB:   {} ({} events)",
            fmt_count(app.db_decks),
            fmt_count(app.db_events)
        )),
    ];
    f.render_widget(Paragraph::new(decks), cols[1]);
}

fn render_logs(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" Logs ({}) ", app.logs.len()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let visible_height = inner.height as usize;
    let total = app.logs.len();
    let start = app.log_scroll.min(total.saturating_sub(visible_height));

    let log_lines: Vec<Line> = app.logs
        .iter()
        .skip(start)
        .take(visible_height)
        .map(|msg| {
            let style = if msg.starts_with("ERROR") {
                Style::default().fg(Color::Red)
            } else if msg.starts_with("WARN") {
                Style::default().fg(Color::Yellow)
            } else if msg.starts_with("Saved") || msg.contains("done") {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(format!("  {}", msg), style))
        })
        .collect();

    f.render_widget(Paragraph::new(log_lines).wrap(Wrap { trim: false }), inner);
}

fn render_controls(f: &mut Frame, area: Rect, app: &App) {
    let controls = match app.run_state {
        RunState::Running => " [P] Pause  [C] Cancel  [Q] Quit  [↑↓] Scroll logs ",
        RunState::Paused => " [R] Resume  [C] Cancel  [Q] Quit  [↑↓] Scroll logs ",
        RunState::Finished | RunState::Cancelled | RunState::Error(_) => {
            " [Esc] Back to settings  [Q] Quit  [↑↓] Scroll logs "
        }
        RunState::Idle => "",
    };
    let para = Paragraph::new(Line::from(Span::styled(
        controls,
        Style::default().fg(Color::DarkGray),
    )))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    f.render_widget(para, area);
}
