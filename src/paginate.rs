use crate::dates::DateWindow;
use crate::events::{EventSink, UiEvent};
use crate::fetch::Fetch;
use crate::model::Event;
use crate::schema::PageSchema;
use anyhow::Result;

/// Walk listing pages from 1 upwards, collecting in-window events.
///
/// Pages run newest to oldest, so the walk stops at the first page whose
/// earliest date precedes the window start. A failed fetch, a page without a
/// recognisable event table, or a page with no parseable date also ends it:
/// results are truncated rather than the run aborted. Only cancellation is
/// returned as an error.
pub fn paginate(
    fetcher: &dyn Fetch,
    schema: &dyn PageSchema,
    window: &DateWindow,
    sink: &dyn EventSink,
) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    let mut page = 1u32;

    loop {
        sink.check()?;

        let url = schema.listing_url(page);
        let doc = match fetcher.fetch(&url) {
            Ok(doc) => doc,
            Err(e) => {
                sink.send(UiEvent::Warn(format!("listing page {} unavailable, stopping: {}", page, e)));
                break;
            }
        };

        let scanned = match schema.extract_events(&doc, window) {
            Ok(scanned) => scanned,
            Err(e) => {
                sink.send(UiEvent::Warn(format!("listing page {}: {}, stopping", page, e)));
                break;
            }
        };

        for msg in &scanned.skipped {
            sink.send(UiEvent::Warn(format!("listing page {}: {}", page, msg)));
        }
        for event in &scanned.events {
            sink.send(UiEvent::Log(format!("Found event: {} {} ({})", event.date, event.name, event.url)));
        }
        sink.send(UiEvent::PageScanned {
            page,
            found: scanned.events.len(),
            earliest: scanned.earliest.clone(),
        });
        events.extend(scanned.events);

        match scanned.earliest {
            Some(earliest) if !window.precedes(&earliest) => page += 1,
            _ => break,
        }
    }

    sink.send(UiEvent::PaginationFinished { pages: page, events: events.len() });
    Ok(events)
}
