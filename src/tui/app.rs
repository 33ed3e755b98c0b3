use crate::config::{Config, MAX_TRAILING_DAYS};
use crate::dates::date_value;
use crate::events::{PipelineControl, UiEvent};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::Duration;

// ── Screens ─────────────────────────────────────────────────────────────────

#[derive(PartialEq, Clone)]
pub enum Screen {
    Config,
    Dashboard,
}

#[derive(PartialEq, Clone)]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Finished,
    Cancelled,
    Error(String),
}

#[derive(PartialEq, Clone)]
pub enum Phase {
    Discovering,
    Downloading,
    Loading,
    Done,
}

// ── Config field ────────────────────────────────────────────────────────────

pub struct ConfigField {
    pub label: &'static str,
    pub value: String,
    pub hint: &'static str,
}

// ── App state ───────────────────────────────────────────────────────────────

pub struct App {
    pub screen: Screen,

    // Config screen
    pub fields: Vec<ConfigField>,
    pub selected: usize,
    pub editing: bool,
    pub edit_cursor: usize,
    pub validation_error: Option<String>,

    // Dashboard state
    pub run_state: RunState,
    pub phase: Phase,
    pub window: String,

    // Discovery
    pub pages_scanned: u32,
    pub events_found: usize,

    // Current event
    pub current_event: usize,
    pub total_events: usize,
    pub event_name: String,
    pub decks_total: usize,
    pub decks_done: usize,

    // Cumulative totals
    pub published: usize,
    pub already_published: usize,
    pub empty: usize,
    pub failed: usize,
    pub decks_saved: usize,
    pub decks_failed: usize,
    pub db_events: usize,
    pub db_decks: usize,

    // Logs
    pub logs: Vec<String>,
    pub log_scroll: usize,

    // Communication
    pub event_rx: Option<mpsc::Receiver<UiEvent>>,
    pub control: Option<Arc<PipelineControl>>,

    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        let defaults = Config::default_pauper();
        Self {
            screen: Screen::Config,
            fields: vec![
                ConfigField { label: "Start Date", value: String::new(), hint: "YYYYMMDD, empty = trailing window" },
                ConfigField { label: "End Date", value: String::new(), hint: "YYYYMMDD, empty = today" },
                ConfigField { label: "Trailing Days", value: defaults.trailing_days.to_string(), hint: "default window length" },
                ConfigField { label: "Format", value: defaults.format_code, hint: "e.g. PAU, MO, LE" },
                ConfigField { label: "Meta ID", value: defaults.meta_id.to_string(), hint: "metagame period on the site" },
                ConfigField { label: "Request Delay (s)", value: defaults.request_delay.as_secs_f64().to_string(), hint: "pause before every request" },
                ConfigField { label: "Output Directory", value: defaults.output_dir.display().to_string(), hint: "data/ and .staging/ go here" },
                ConfigField { label: "Load Database", value: "no".into(), hint: "yes/no, after scraping" },
            ],
            selected: 0,
            editing: false,
            edit_cursor: 0,
            validation_error: None,

            run_state: RunState::Idle,
            phase: Phase::Discovering,
            window: String::new(),

            pages_scanned: 0,
            events_found: 0,

            current_event: 0,
            total_events: 0,
            event_name: String::new(),
            decks_total: 0,
            decks_done: 0,

            published: 0,
            already_published: 0,
            empty: 0,
            failed: 0,
            decks_saved: 0,
            decks_failed: 0,
            db_events: 0,
            db_decks: 0,

            logs: Vec::new(),
            log_scroll: 0,

            event_rx: None,
            control: None,
            should_quit: false,
        }
    }

    /// Total config fields + 1 for the Start button.
    pub fn total_items(&self) -> usize {
        self.fields.len() + 1
    }

    pub fn is_on_start_button(&self) -> bool {
        self.selected == self.fields.len()
    }

    pub fn add_log(&mut self, msg: String) {
        self.logs.push(msg);
        // Auto-scroll to bottom
        let visible = 10usize; // approximate visible log lines
        if self.logs.len() > visible {
            self.log_scroll = self.logs.len() - visible;
        }
    }

    /// Process a pipeline event.
    pub fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(msg) => self.add_log(msg),
            UiEvent::Warn(msg) => self.add_log(format!("WARN: {}", msg)),

            UiEvent::WindowResolved { start, end } => {
                self.window = format!("{} .. {}", start, end);
                self.phase = Phase::Discovering;
            }

            UiEvent::PageScanned { page, found, earliest } => {
                self.pages_scanned = page;
                self.events_found += found;
                self.add_log(format!(
                    "Page {}: {} in window (earliest {})",
                    page,
                    found,
                    earliest.as_deref().unwrap_or("n/a")
                ));
            }
            UiEvent::PaginationFinished { pages, events } => {
                self.pages_scanned = pages;
                self.events_found = events;
                self.total_events = events;
                self.phase = Phase::Downloading;
                self.add_log(format!("Discovery done: {} events over {} pages", events, pages));
            }

            UiEvent::EventStarted { index, total, name } => {
                self.current_event = index;
                self.total_events = total;
                self.event_name = name.clone();
                self.decks_total = 0;
                self.decks_done = 0;
                self.add_log(format!("[{}/{}] {}", index + 1, total, name));
            }
            UiEvent::EventAlreadyPublished { name } => {
                self.already_published += 1;
                self.add_log(format!("Skipped (already downloaded): {}", name));
            }
            UiEvent::DecksFound { count } => {
                self.decks_total = count;
            }
            UiEvent::DeckSaved { .. } => {
                self.decks_done += 1;
            }
            UiEvent::DeckFailed { player, reason, .. } => {
                self.decks_done += 1;
                self.add_log(format!("WARN: deck of {} skipped: {}", player, reason));
            }
            UiEvent::EventPublished { path, saved, attempted } => {
                self.published += 1;
                self.decks_saved += saved;
                self.decks_failed += attempted - saved;
                self.add_log(format!("Saved {} ({}/{} decks) complete", path.display(), saved, attempted));
            }
            UiEvent::EventEmpty { name } => {
                self.empty += 1;
                self.decks_failed += self.decks_total;
                self.add_log(format!("No decks saved for {}", name));
            }
            UiEvent::EventFailed { name, reason } => {
                self.failed += 1;
                self.add_log(format!("ERROR: {}: {}", name, reason));
            }

            UiEvent::LoadStarted => {
                self.phase = Phase::Loading;
                self.add_log("Loading database...".into());
            }
            UiEvent::EventLoaded { decks, .. } => {
                self.db_events += 1;
                self.db_decks += decks;
            }
            UiEvent::LoadComplete { events, decks, skipped } => {
                self.add_log(format!(
                    "Load done: {} events, {} decks, {} already present",
                    events, decks, skipped
                ));
            }

            UiEvent::Finished => {
                self.phase = Phase::Done;
                self.run_state = RunState::Finished;
                self.add_log("=== Pipeline finished ===".into());
            }

            UiEvent::Error(msg) => {
                if self.run_state != RunState::Cancelled {
                    self.run_state = RunState::Error(msg.clone());
                }
                self.add_log(format!("ERROR: {}", msg));
            }
        }
    }

    /// Validate config fields and build a Config struct.
    pub fn build_config(&self) -> Result<Config, String> {
        let start_date = parse_date_field(&self.fields[0].value, "Start date")?;
        let end_date = parse_date_field(&self.fields[1].value, "End date")?;
        if let (Some(start), Some(end)) = (&start_date, &end_date) {
            if date_value(start) > date_value(end) {
                return Err("Start date must be before or equal to end date".into());
            }
        }

        let trailing_days: u32 = self.fields[2].value.trim().parse()
            .map_err(|_| "Trailing days must be a non-negative integer")?;
        if trailing_days > MAX_TRAILING_DAYS {
            return Err(format!("Trailing days must be at most {}", MAX_TRAILING_DAYS));
        }

        let format_code = self.fields[3].value.trim().to_string();
        if format_code.is_empty() {
            return Err("Format cannot be empty".into());
        }
        let meta_id: u32 = self.fields[4].value.trim().parse()
            .map_err(|_| "Meta ID must be a positive integer")?;

        let delay_secs: f64 = self.fields[5].value.trim().parse()
            .map_err(|_| "Request delay must be a number")?;
        if !(0.0..=600.0).contains(&delay_secs) {
            return Err("Request delay must be between 0 and 600 seconds".into());
        }

        let output_dir = PathBuf::from(self.fields[6].value.trim());
        let load_database = match self.fields[7].value.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" => true,
            "no" | "n" | "false" | "" => false,
            _ => return Err("Load database must be yes or no".into()),
        };

        let defaults = Config::default_pauper();
        Ok(Config {
            base_url: defaults.base_url,
            format_code,
            meta_id,
            start_date,
            end_date,
            trailing_days,
            request_delay: Duration::from_secs_f64(delay_secs),
            db_path: output_dir.join("pauper.db"),
            output_dir,
            load_database,
        })
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn parse_date_field(s: &str, label: &str) -> Result<Option<String>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    if s.len() != 8 || chrono::NaiveDate::parse_from_str(s, "%Y%m%d").is_err() {
        return Err(format!("{} '{}' must be a valid YYYYMMDD date", label, s));
    }
    Ok(Some(s.to_string()))
}

pub fn fmt_count(n: usize) -> String {
    if n >= 1_000_000 { format!("{:.1}M", n as f64 / 1e6) }
    else if n >= 1_000 { format!("{:.1}K", n as f64 / 1e3) }
    else { n.to_string() }
}
