use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use thiserror::Error;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc, Arc, Condvar, Mutex,
};

// ── Events from pipeline to UI ──────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum UiEvent {
    Log(String),
    /// A row, deck or event was skipped; the run continues.
    Warn(String),

    WindowResolved { start: u32, end: u32 },

    PageScanned { page: u32, found: usize, earliest: Option<String> },
    PaginationFinished { pages: u32, events: usize },

    EventStarted { index: usize, total: usize, name: String },
    EventAlreadyPublished { name: String },
    DecksFound { count: usize },
    DeckSaved { index: usize, player: String },
    DeckFailed { index: usize, player: String, reason: String },
    EventPublished { path: PathBuf, saved: usize, attempted: usize },
    EventEmpty { name: String },
    EventFailed { name: String, reason: String },

    LoadStarted,
    EventLoaded { name: String, decks: usize },
    LoadComplete { events: usize, decks: usize, skipped: usize },

    Finished,
    Error(String),
}

// ── Pipeline control (pause / cancel) ───────────────────────────────────────

/// Returned by [`EventSink::check`] once the user cancels. Callers that
/// swallow per-item errors must let this one through.
#[derive(Debug, Error)]
#[error("Cancelled by user")]
pub struct Cancelled;

/// Whether `err` is a cancellation rather than an ordinary failure.
pub fn is_cancelled(err: &anyhow::Error) -> bool {
    err.is::<Cancelled>()
}

pub struct PipelineControl {
    paused: AtomicBool,
    cancelled: AtomicBool,
    lock: Mutex<()>,
    cvar: Condvar,
}

impl PipelineControl {
    pub fn new() -> Self {
        Self {
            paused: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            lock: Mutex::new(()),
            cvar: Condvar::new(),
        }
    }

    pub fn pause(&self) {
        let _guard = self.lock.lock().unwrap();
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        let _guard = self.lock.lock().unwrap();
        self.paused.store(false, Ordering::SeqCst);
        self.cvar.notify_all();
    }

    pub fn cancel(&self) {
        let _guard = self.lock.lock().unwrap();
        self.cancelled.store(true, Ordering::SeqCst);
        self.cvar.notify_all(); // unblock if paused
    }

    /// Blocks while paused. Returns [`Cancelled`] once cancelled.
    ///
    /// Flags only change under `lock`, so a resume cannot slip in between
    /// the paused test and the wait.
    pub fn check(&self) -> Result<()> {
        let guard = self.lock.lock().unwrap();
        let _guard = self
            .cvar
            .wait_while(guard, |_| {
                self.paused.load(Ordering::SeqCst) && !self.cancelled.load(Ordering::SeqCst)
            })
            .unwrap();
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(Cancelled.into());
        }
        Ok(())
    }
}

// ── EventSink trait ─────────────────────────────────────────────────────────

/// Abstraction for sending pipeline events.
pub trait EventSink: Send + Sync {
    fn send(&self, event: UiEvent);
    /// Check for pause/cancel. Blocks while paused. Returns Err if cancelled.
    fn check(&self) -> Result<()>;
}

// ── Console sink (headless mode) ────────────────────────────────────────────

pub struct ConsoleSink {
    pb: Mutex<Option<ProgressBar>>,
}

impl ConsoleSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            pb: Mutex::new(None),
        })
    }

    fn make_pb(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} decks {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb
    }

    /// Print above the progress bar if one is active.
    fn line(&self, msg: String, to_stderr: bool) {
        match self.pb.lock().unwrap().as_ref() {
            Some(pb) => pb.println(msg),
            None if to_stderr => eprintln!("{}", msg),
            None => println!("{}", msg),
        }
    }

    fn finish_pb(&self) {
        if let Some(pb) = self.pb.lock().unwrap().take() {
            pb.finish_and_clear();
        }
    }
}

impl EventSink for ConsoleSink {
    fn send(&self, event: UiEvent) {
        match event {
            UiEvent::Log(msg) => self.line(format!("  {}", msg), false),
            UiEvent::Warn(msg) => self.line(format!("  WARN: {}", msg), true),

            UiEvent::WindowResolved { start, end } => {
                println!("Window: {} .. {}", start, end);
            }

            UiEvent::PageScanned { page, found, earliest } => {
                println!(
                    "  Page {}: {} in window (earliest {})",
                    page,
                    found,
                    earliest.as_deref().unwrap_or("n/a")
                );
            }
            UiEvent::PaginationFinished { pages, events } => {
                println!("\n  {} events found across {} pages", events, pages);
            }

            UiEvent::EventStarted { index, total, name } => {
                println!("\n━━━ [{}/{}] {} ━━━", index + 1, total, name);
            }
            UiEvent::EventAlreadyPublished { name } => {
                println!("  Already downloaded: {}", name);
            }
            UiEvent::DecksFound { count } => {
                *self.pb.lock().unwrap() = Some(Self::make_pb(count as u64));
            }
            UiEvent::DeckSaved { player, .. } => {
                if let Some(pb) = self.pb.lock().unwrap().as_ref() {
                    pb.set_message(player);
                    pb.inc(1);
                }
            }
            UiEvent::DeckFailed { player, reason, .. } => {
                self.line(format!("  WARN: deck of {} skipped: {}", player, reason), true);
                if let Some(pb) = self.pb.lock().unwrap().as_ref() {
                    pb.inc(1);
                }
            }
            UiEvent::EventPublished { path, saved, attempted } => {
                self.finish_pb();
                println!("  Saved {} ({}/{} decks)", path.display(), saved, attempted);
            }
            UiEvent::EventEmpty { name } => {
                self.finish_pb();
                println!("  No decks saved for {}", name);
            }
            UiEvent::EventFailed { name, reason } => {
                self.finish_pb();
                eprintln!("  ERROR: {}: {}", name, reason);
            }

            UiEvent::LoadStarted => println!("\n━━━ Loading database ━━━"),
            UiEvent::EventLoaded { name, decks } => {
                println!("  Loaded {} ({} decks)", name, decks);
            }
            UiEvent::LoadComplete { events, decks, skipped } => {
                println!(
                    "  {} events / {} decks loaded, {} already present",
                    events, decks, skipped
                );
            }

            UiEvent::Finished => println!("\n=== Complete ==="),
            UiEvent::Error(msg) => {
                self.finish_pb();
                eprintln!("\n  ERROR: {}", msg);
            }
        }
    }

    fn check(&self) -> Result<()> {
        Ok(())
    }
}

// ── Channel sink (TUI mode) ────────────────────────────────────────────────

pub struct ChannelSink {
    tx: mpsc::Sender<UiEvent>,
    control: Arc<PipelineControl>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<UiEvent>, control: Arc<PipelineControl>) -> Arc<Self> {
        Arc::new(Self { tx, control })
    }
}

impl EventSink for ChannelSink {
    fn send(&self, event: UiEvent) {
        let _ = self.tx.send(event);
    }

    fn check(&self) -> Result<()> {
        self.control.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_cancel_unblocks_paused_check() {
        let control = Arc::new(PipelineControl::new());
        control.pause();

        let worker = {
            let control = control.clone();
            thread::spawn(move || control.check())
        };
        thread::sleep(Duration::from_millis(20));
        control.cancel();

        let err = worker.join().unwrap().unwrap_err();
        assert!(is_cancelled(&err));
    }

    #[test]
    fn test_resume_unblocks_paused_check() {
        let control = Arc::new(PipelineControl::new());
        control.pause();

        let worker = {
            let control = control.clone();
            thread::spawn(move || control.check())
        };
        thread::sleep(Duration::from_millis(20));
        assert!(!worker.is_finished());
        control.resume();

        assert!(worker.join().unwrap().is_ok());
    }

    #[test]
    fn test_resume_before_check_does_not_block() {
        let control = PipelineControl::new();
        control.pause();
        control.resume();
        assert!(control.check().is_ok());
    }

    #[test]
    fn test_channel_sink_forwards_events() {
        let (tx, rx) = mpsc::channel();
        let sink = ChannelSink::new(tx, Arc::new(PipelineControl::new()));
        sink.send(UiEvent::DecksFound { count: 3 });
        assert!(sink.check().is_ok());
        assert!(matches!(rx.try_recv(), Ok(UiEvent::DecksFound { count: 3 })));
    }
}
