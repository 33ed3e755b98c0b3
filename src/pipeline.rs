use crate::config::Config;
use crate::database::Database;
use crate::dates::DateWindow;
use crate::events::{is_cancelled, ConsoleSink, EventSink, UiEvent};
use crate::fetch::{Fetch, HttpFetcher};
use crate::limiter::{FixedDelay, RateLimiter, Unthrottled};
use crate::loader;
use crate::model::Event;
use crate::mtgtop8::Mtgtop8Schema;
use crate::paginate::paginate;
use crate::publish::{PublishResult, Publisher};
use crate::schema::PageSchema;
use anyhow::Result;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Outcome counts of one run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub events_found: usize,
    pub published: usize,
    pub already_published: usize,
    pub empty: usize,
    pub failed: usize,
    pub decks_saved: usize,
    pub decks_failed: usize,
}

/// Run the pipeline in headless mode (console output).
pub fn run(config: &Config) -> Result<()> {
    let sink = ConsoleSink::new();
    sink.send(UiEvent::Log(format!("Output: {}", config.output_dir.display())));
    sink.send(UiEvent::Log(format!(
        "Source: {} (format {}, meta {})",
        config.base_url, config.format_code, config.meta_id
    )));
    sink.send(UiEvent::Log(format!(
        "Request delay: {:.1}s",
        config.request_delay.as_secs_f64()
    )));
    run_with_sink(config, sink)
}

/// Load an existing data tree into the database without scraping.
pub fn load_only(config: &Config) -> Result<()> {
    let sink = ConsoleSink::new();
    let mut db = Database::open(&config.db_path)?;
    loader::load_tree(&mut db, &config.data_dir(), &*sink)?;
    report_db_totals(&db, &*sink)?;
    sink.send(UiEvent::Finished);
    Ok(())
}

/// Run the pipeline with a given EventSink (used by both headless and TUI).
pub fn run_with_sink(config: &Config, sink: Arc<dyn EventSink>) -> Result<()> {
    let window = config.resolve_window(chrono::Local::now().date_naive())?;
    sink.send(UiEvent::WindowResolved { start: window.start(), end: window.end() });

    fs::create_dir_all(config.data_dir())?;
    fs::create_dir_all(config.staging_dir())?;

    let limiter: Box<dyn RateLimiter> = if config.request_delay.is_zero() {
        Box::new(Unthrottled)
    } else {
        Box::new(FixedDelay::new(config.request_delay))
    };
    let fetcher = HttpFetcher::new(limiter, sink.clone());
    let schema = Mtgtop8Schema::new(&config.base_url, &config.format_code, config.meta_id)?;

    let summary = download_results(
        &fetcher,
        &schema,
        &window,
        &config.data_dir(),
        &config.staging_dir(),
        &*sink,
    )?;
    sink.send(UiEvent::Log(format!(
        "{} events: {} published, {} already present, {} empty, {} failed; {} decks saved, {} failed",
        summary.events_found,
        summary.published,
        summary.already_published,
        summary.empty,
        summary.failed,
        summary.decks_saved,
        summary.decks_failed
    )));

    if config.load_database {
        let mut db = Database::open(&config.db_path)?;
        loader::load_tree(&mut db, &config.data_dir(), &*sink)?;
        report_db_totals(&db, &*sink)?;
    }

    sink.send(UiEvent::Finished);
    Ok(())
}

/// Discover every event in `window` and publish each one.
///
/// A failure on one event, including a staging I/O error, is reported and
/// the next event is attempted. Only cancellation ends the run early, even
/// when it lands in the middle of an event.
pub fn download_results(
    fetcher: &dyn Fetch,
    schema: &dyn PageSchema,
    window: &DateWindow,
    data_dir: &Path,
    staging_dir: &Path,
    sink: &dyn EventSink,
) -> Result<RunSummary> {
    let events = paginate(fetcher, schema, window, sink)?;
    let publisher = Publisher::new(fetcher, schema, sink, data_dir, staging_dir);

    let mut summary = RunSummary { events_found: events.len(), ..Default::default() };
    let total = events.len();
    for (index, event) in events.iter().enumerate() {
        sink.check()?;
        sink.send(UiEvent::EventStarted { index, total, name: event.name.clone() });
        publish_one(&publisher, event, sink, &mut summary)?;
    }
    Ok(summary)
}

fn publish_one(
    publisher: &Publisher,
    event: &Event,
    sink: &dyn EventSink,
    summary: &mut RunSummary,
) -> Result<()> {
    match publisher.publish_event(event) {
        Ok(PublishResult::AlreadyPublished { path }) => {
            summary.already_published += 1;
            sink.send(UiEvent::EventAlreadyPublished { name: path.display().to_string() });
        }
        Ok(PublishResult::Published { path, saved, attempted }) => {
            summary.published += 1;
            summary.decks_saved += saved;
            summary.decks_failed += attempted - saved;
            sink.send(UiEvent::EventPublished { path, saved, attempted });
        }
        Ok(PublishResult::Empty { attempted }) => {
            summary.empty += 1;
            summary.decks_failed += attempted;
            sink.send(UiEvent::EventEmpty { name: event.name.clone() });
        }
        Err(e) if is_cancelled(&e) => return Err(e),
        Err(e) => {
            summary.failed += 1;
            sink.send(UiEvent::EventFailed { name: event.name.clone(), reason: format!("{:#}", e) });
        }
    }
    Ok(())
}

fn report_db_totals(db: &Database, sink: &dyn EventSink) -> Result<()> {
    sink.send(UiEvent::Log(format!(
        "Database holds {} events, {} decks",
        db.count_events()?,
        db.count_decks()?
    )));
    Ok(())
}
