use crate::tui::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const LABEL_WIDTH: usize = 20;

pub fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),  // Title
            Constraint::Min(13),    // Form
            Constraint::Length(4),  // Preview / validation
            Constraint::Length(3),  // Help
        ])
        .split(area);

    render_title(f, chunks[0]);
    render_form(f, chunks[1], app);
    render_preview(f, chunks[2], app);
    render_help(f, chunks[3], app);
}

fn render_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(vec![
        Span::styled(" Deck Scraper ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::styled(" tournament results to disk", Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
    f.render_widget(title, area);
}

fn field_line<'a>(app: &'a App, i: usize) -> Line<'a> {
    let field = &app.fields[i];
    let selected = app.selected == i;
    let editing = selected && app.editing;

    let label_style = if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let value_style = match (editing, selected) {
        (true, _) => Style::default().fg(Color::White).bg(Color::DarkGray),
        (false, true) => Style::default().fg(Color::White),
        _ => Style::default().fg(Color::Gray),
    };

    let value = if editing {
        let (before, after) = field.value.split_at(app.edit_cursor.min(field.value.len()));
        format!("{}▏{}", before, after)
    } else if field.value.is_empty() {
        "(default)".to_string()
    } else {
        field.value.clone()
    };

    Line::from(vec![
        Span::styled(format!("{:>width$} │ ", field.label, width = LABEL_WIDTH), label_style),
        Span::styled(value, value_style),
        Span::styled(format!("  {}", field.hint), Style::default().fg(Color::DarkGray)),
    ])
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Scrape Settings ");

    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut constraints: Vec<Constraint> = app.fields.iter().map(|_| Constraint::Length(1)).collect();
    constraints.push(Constraint::Length(1)); // spacer
    constraints.push(Constraint::Length(1)); // start button
    constraints.push(Constraint::Min(0));

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(inner);

    for i in 0..app.fields.len() {
        f.render_widget(Paragraph::new(field_line(app, i)), rows[i]);
    }

    let btn_idx = app.fields.len() + 1;
    let selected = app.is_on_start_button();
    let btn_style = if selected {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let arrow = if selected { "▶ " } else { "  " };
    let line = Line::from(vec![
        Span::raw(" ".repeat(LABEL_WIDTH + 1)),
        Span::styled(format!("{}[ Start Scraping ]", arrow), btn_style),
    ]);
    if btn_idx < rows.len() {
        f.render_widget(Paragraph::new(line), rows[btn_idx]);
    }
}

/// Validation error, or what the run would do with the current values.
fn render_preview(f: &mut Frame, area: Rect, app: &App) {
    let error_line = |err: &str| {
        vec![Line::from(Span::styled(format!(" ⚠ {}", err), Style::default().fg(Color::Red)))]
    };
    let lines = match (&app.validation_error, app.build_config()) {
        (Some(err), _) => error_line(err),
        (None, Err(err)) => error_line(&err),
        (None, Ok(config)) => {
            let window = match (&config.start_date, &config.end_date) {
                (None, None) => format!("last {} days through today", config.trailing_days),
                (start, end) => format!(
                    "{} .. {}",
                    start.as_deref().unwrap_or("(trailing)"),
                    end.as_deref().unwrap_or("today")
                ),
            };
            vec![
                Line::from(Span::styled(
                    format!(" Window: {}   Format: {}", window, config.format_code),
                    Style::default().fg(Color::Gray),
                )),
                Line::from(Span::styled(
                    format!(" Events → {}", config.data_dir().display()),
                    Style::default().fg(Color::DarkGray),
                )),
            ]
        }
    };
    let para = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    f.render_widget(para, area);
}

fn render_help(f: &mut Frame, area: Rect, app: &App) {
    let help_text = if app.editing {
        " Type to edit │ Enter: Confirm │ Esc: Cancel "
    } else {
        " ↑↓: Navigate │ Enter: Edit/Start │ Space: Toggle yes/no │ F5: Start │ q: Quit "
    };
    let help = Paragraph::new(Line::from(Span::styled(
        help_text,
        Style::default().fg(Color::DarkGray),
    )))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    f.render_widget(help, area);
}
