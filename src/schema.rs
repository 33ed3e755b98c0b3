use crate::dates::DateWindow;
use crate::error::ScrapeError;
use crate::model::{Deck, DecklistText, Event};
use scraper::Html;

/// Events parsed from one listing page.
#[derive(Debug, Default)]
pub struct EventPage {
    /// In-window events, in page order.
    pub events: Vec<Event>,
    /// Earliest parsed date on the page, in or out of the window.
    pub earliest: Option<String>,
    /// One message per row that was skipped.
    pub skipped: Vec<String>,
}

/// Ranked decks parsed from one event page.
#[derive(Debug, Default)]
pub struct DeckPage {
    pub decks: Vec<Deck>,
    pub num_players: Option<u32>,
    pub skipped: Vec<String>,
}

/// Markup contract for one version of the source site.
///
/// Every selector, table index and inline style string the pipeline depends
/// on lives behind this trait; a site redesign is absorbed by a new
/// implementation. Extraction methods are pure.
pub trait PageSchema {
    /// Listing page URL; pages are numbered from 1, newest first.
    fn listing_url(&self, page: u32) -> String;

    fn extract_events(&self, doc: &Html, window: &DateWindow) -> Result<EventPage, ScrapeError>;

    /// Decks in ranked order.
    fn extract_decks(&self, doc: &Html) -> Result<DeckPage, ScrapeError>;

    fn extract_decklist(&self, doc: &Html) -> Result<DecklistText, ScrapeError>;
}
