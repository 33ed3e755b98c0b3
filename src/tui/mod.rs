pub mod app;
pub mod config_screen;
pub mod dashboard;

use crate::config::Config;
use crate::events::{ChannelSink, PipelineControl, UiEvent};
use crate::pipeline;
use app::{App, RunState, Screen};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::{mpsc, Arc};
use std::time::Duration;

/// Index of the yes/no "Load Database" field.
const TOGGLE_FIELD: usize = 7;

/// Run the full TUI application.
pub fn run() -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();
    let result = main_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn main_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| match app.screen {
            Screen::Config => config_screen::render(f, app),
            Screen::Dashboard => dashboard::render(f, app),
        })?;

        // Drain pipeline events
        let events: Vec<_> = app.event_rx.as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default();
        for event in events {
            app.handle_event(event);
        }

        // Most of a run is spent in the request delay; 100ms polling is plenty
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != event::KeyEventKind::Press {
                    continue;
                }

                if key.code == KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    if let Some(control) = &app.control {
                        control.cancel();
                    }
                    break;
                }

                match app.screen {
                    Screen::Config => handle_config_key(app, key),
                    Screen::Dashboard => handle_dashboard_key(app, key),
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

// ── Config screen key handling ──────────────────────────────────────────────

fn handle_edit_key(app: &mut App, key: event::KeyEvent) {
    let value = &mut app.fields[app.selected].value;
    let cursor = app.edit_cursor.min(value.len());
    match key.code {
        KeyCode::Enter | KeyCode::Esc => app.editing = false,
        // Byte cursor; input is restricted to ASCII.
        KeyCode::Char(c) if c.is_ascii() => {
            value.insert(cursor, c);
            app.edit_cursor = cursor + 1;
        }
        KeyCode::Backspace if cursor > 0 => {
            value.remove(cursor - 1);
            app.edit_cursor = cursor - 1;
        }
        KeyCode::Delete if cursor < value.len() => {
            value.remove(cursor);
        }
        KeyCode::Left => app.edit_cursor = cursor.saturating_sub(1),
        KeyCode::Right => app.edit_cursor = (cursor + 1).min(value.len()),
        KeyCode::Home => app.edit_cursor = 0,
        KeyCode::End => app.edit_cursor = value.len(),
        _ => {}
    }
}

fn handle_config_key(app: &mut App, key: event::KeyEvent) {
    if app.editing {
        handle_edit_key(app, key);
        app.validation_error = None;
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Up => app.selected = app.selected.saturating_sub(1),
        KeyCode::Down => app.selected = (app.selected + 1).min(app.total_items() - 1),
        KeyCode::Tab => app.selected = (app.selected + 1) % app.total_items(),
        KeyCode::BackTab => {
            app.selected = (app.selected + app.total_items() - 1) % app.total_items();
        }
        KeyCode::Char(' ') if app.selected == TOGGLE_FIELD => {
            let field = &mut app.fields[TOGGLE_FIELD];
            field.value = if field.value.trim().eq_ignore_ascii_case("yes") { "no" } else { "yes" }.into();
        }
        KeyCode::Enter if app.is_on_start_button() => try_start_pipeline(app),
        KeyCode::Enter => {
            app.editing = true;
            app.edit_cursor = app.fields[app.selected].value.len();
        }
        KeyCode::F(5) => try_start_pipeline(app),
        _ => {}
    }
}

fn try_start_pipeline(app: &mut App) {
    match app.build_config() {
        Ok(config) => {
            app.validation_error = None;
            start_pipeline(app, config);
        }
        Err(err) => app.validation_error = Some(err),
    }
}

fn start_pipeline(app: &mut App, config: Config) {
    let (tx, rx) = mpsc::channel::<UiEvent>();
    let control = Arc::new(PipelineControl::new());
    let sink = ChannelSink::new(tx.clone(), control.clone());

    let fields = std::mem::take(&mut app.fields);
    *app = App::new();
    app.fields = fields;

    app.event_rx = Some(rx);
    app.control = Some(control);
    app.screen = Screen::Dashboard;
    app.run_state = RunState::Running;

    // The run emits its own Finished event; only failures are reported here.
    std::thread::spawn(move || {
        if let Err(e) = pipeline::run_with_sink(&config, sink) {
            let _ = tx.send(UiEvent::Error(format!("{:#}", e)));
        }
    });
}

// ── Dashboard key handling ──────────────────────────────────────────────────

fn is_active(state: &RunState) -> bool {
    matches!(state, RunState::Running | RunState::Paused)
}

fn handle_dashboard_key(app: &mut App, key: event::KeyEvent) {
    let control = app.control.clone();
    match key.code {
        KeyCode::Char('q') => {
            if let Some(control) = &control {
                control.cancel();
            }
            app.should_quit = true;
        }
        KeyCode::Char('c') if is_active(&app.run_state) => {
            if let Some(control) = &control {
                control.cancel();
            }
            app.run_state = RunState::Cancelled;
            app.add_log("Cancelling after the current request...".into());
        }
        KeyCode::Char('p') if app.run_state == RunState::Running => {
            if let Some(control) = &control {
                control.pause();
            }
            app.run_state = RunState::Paused;
        }
        KeyCode::Char('r') if app.run_state == RunState::Paused => {
            if let Some(control) = &control {
                control.resume();
            }
            app.run_state = RunState::Running;
        }
        KeyCode::Esc if !is_active(&app.run_state) => {
            app.screen = Screen::Config;
            app.event_rx = None;
            app.control = None;
        }
        KeyCode::Up => app.log_scroll = app.log_scroll.saturating_sub(1),
        KeyCode::Down => {
            app.log_scroll = (app.log_scroll + 1).min(app.logs.len().saturating_sub(1));
        }
        KeyCode::PageUp => app.log_scroll = app.log_scroll.saturating_sub(10),
        KeyCode::PageDown => {
            app.log_scroll = (app.log_scroll + 10).min(app.logs.len().saturating_sub(1));
        }
        _ => {}
    }
}
