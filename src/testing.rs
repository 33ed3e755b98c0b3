//! Fixtures shared by unit tests: an in-memory fetcher, a recording sink and
//! builders for the three page shapes the site serves.

use crate::error::{FetchFailure, ScrapeError};
use crate::events::{Cancelled, EventSink, UiEvent};
use crate::fetch::Fetch;
use anyhow::Result;
use scraper::Html;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const BASE: &str = "https://mtg.test";

/// Serves canned HTML by URL; unknown URLs answer 404.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetch for MockFetcher {
    fn fetch(&self, url: &str) -> Result<Html, ScrapeError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(body) => Ok(Html::parse_document(body)),
            None => Err(ScrapeError::Fetch {
                url: url.to_string(),
                failure: FetchFailure::Status(404),
            }),
        }
    }
}

/// Keeps every event; optionally reports cancellation after `n` checks.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<UiEvent>>,
    checks: AtomicUsize,
    cancel_after: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancelling_after(checks: usize) -> Self {
        Self { cancel_after: Some(checks), ..Self::default() }
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Warn(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn send(&self, event: UiEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn check(&self) -> Result<()> {
        let n = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
        if self.cancel_after.is_some_and(|limit| n > limit) {
            return Err(Cancelled.into());
        }
        Ok(())
    }
}

/// Format page: a sidebar table, then the event table with `(DD/MM/YY, href, name)` rows.
pub fn listing_html(rows: &[(&str, &str, &str)]) -> String {
    let rows: String = rows
        .iter()
        .map(|(date, href, name)| {
            format!(
                r#"<tr class="hover_tr"><td class="S14" width="70%"><a href="{}">{}</a></td><td align="right" class="S12" width="12%">{}</td></tr>"#,
                href, name, date
            )
        })
        .collect();
    format!(
        r#"<html><body>
<table class="Stable"><tr><td class="S14"><a href="top">Top decks</a></td></tr></table>
<table class="Stable">{}</table>
</body></html>"#,
        rows
    )
}

pub struct DeckRow {
    href: String,
    player: String,
    rank: String,
}

impl DeckRow {
    pub fn new(href: &str, player: &str, rank: &str) -> Self {
        Self { href: href.into(), player: player.into(), rank: rank.into() }
    }

    fn render(&self, class: &str) -> String {
        format!(
            r#"<div class="{}"><div class="S14">{}</div><div style="width:100%;padding-left:4px;margin-bottom:4px;"><a href="{}">Mono-Blue Terror</a></div><div class="G11">{}</div></div>"#,
            class, self.rank, self.href, self.player
        )
    }
}

/// Event page. With `chosen_last` the highlighted row is placed after the others in the markup.
pub fn event_html(players: Option<u32>, chosen: DeckRow, others: &[DeckRow], chosen_last: bool) -> String {
    let meta = match players {
        Some(n) => format!("{} players - 06/08/24", n),
        None => "06/08/24".to_string(),
    };
    let hover: String = others.iter().map(|r| r.render("hover_tr")).collect();
    let rows = if chosen_last {
        format!("{}{}", hover, chosen.render("chosen_tr"))
    } else {
        format!("{}{}", chosen.render("chosen_tr"), hover)
    };
    format!(
        r#"<html><body>
<div style="margin-bottom:5px;">{}</div>
<div style="margin:0px 4px 0px 4px;">{}</div>
</body></html>"#,
        meta, rows
    )
}

/// Deck page with one maindeck column and one sideboard column.
pub fn deck_html(maindeck: &[&str], sideboard: &[&str]) -> String {
    let lines = |cards: &[&str]| -> String {
        cards
            .iter()
            .map(|c| format!(r#"<div class="deck_line hover_tr">{}</div>"#, c))
            .collect()
    };
    format!(
        r#"<html><body>
<div style="display:flex;align-content:stretch;">
<div style="margin:3px;flex:1;"><div class="O14">{} MAIN</div>{}</div>
<div style="margin:3px;flex:1;"><div class="O14">SIDEBOARD</div>{}</div>
</div>
</body></html>"#,
        maindeck.len(),
        lines(maindeck),
        lines(sideboard)
    )
}
