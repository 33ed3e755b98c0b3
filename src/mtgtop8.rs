use crate::dates::{convert_date_str, date_value, DateWindow};
use crate::error::ScrapeError;
use crate::model::{Deck, DecklistText, Event, Finish, SIDEBOARD_MARKER};
use crate::schema::{DeckPage, EventPage, PageSchema};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Markup of mtgtop8.com as of the 2024 layout.
///
/// The event list is the *second* `table.Stable` on a format page; the first
/// one is the "top decks" sidebar. Event and deck pages are keyed on inline
/// style strings rather than classes, so any restyling breaks them.
pub struct Mtgtop8Schema {
    base_url: String,
    format: String,
    meta: u32,
    sel: Selectors,
    players_re: Regex,
}

struct Selectors {
    event_table: Selector,
    row: Selector,
    date_cell: Selector,
    event_link: Selector,
    event_meta: Selector,
    left_nav: Selector,
    chosen_row: Selector,
    hover_row: Selector,
    deck_link: Selector,
    player: Selector,
    rank: Selector,
    decklist: Selector,
    card_group: Selector,
    group_label: Selector,
    card_line: Selector,
}

fn sel(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector(format!("{}: {}", css, e)))
}

impl Selectors {
    fn new() -> Result<Self, ScrapeError> {
        Ok(Self {
            event_table: sel("table.Stable")?,
            row: sel("tr")?,
            date_cell: sel("td.S12")?,
            event_link: sel("td.S14 a")?,
            event_meta: sel(r#"div[style="margin-bottom:5px;"]"#)?,
            left_nav: sel(r#"div[style="margin:0px 4px 0px 4px;"]"#)?,
            chosen_row: sel("div.chosen_tr")?,
            hover_row: sel("div.hover_tr")?,
            deck_link: sel(r#"div[style="width:100%;padding-left:4px;margin-bottom:4px;"] a"#)?,
            player: sel("div.G11")?,
            rank: sel("div.S14")?,
            decklist: sel(r#"div[style="display:flex;align-content:stretch;"]"#)?,
            card_group: sel(r#"div[style="margin:3px;flex:1;"]"#)?,
            group_label: sel("div.O14")?,
            card_line: sel("div.deck_line")?,
        })
    }
}

fn text_of(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

impl Mtgtop8Schema {
    pub fn new(base_url: &str, format: &str, meta: u32) -> Result<Self, ScrapeError> {
        let players_re = Regex::new(r"(\d+) players")
            .map_err(|e| ScrapeError::Selector(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            format: format.to_string(),
            meta,
            sel: Selectors::new()?,
            players_re,
        })
    }

    fn event_url(&self, href: &str) -> String {
        format!("{}/{}", self.base_url, href.trim_start_matches('/'))
    }

    /// Deck links on event pages are query strings relative to `/event`.
    fn deck_url(&self, href: &str) -> String {
        format!("{}/event{}", self.base_url, href)
    }

    /// Parses one listing row. `Ok(None)` means a well-formed row outside the window.
    fn event_from_row(
        &self,
        row: ElementRef,
        window: &DateWindow,
        earliest: &mut Option<String>,
    ) -> Result<Option<Event>, ScrapeError> {
        let date_text = row
            .select(&self.sel.date_cell)
            .next()
            .map(text_of)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ScrapeError::structure("date not found in event row"))?;
        let date = convert_date_str(&date_text)?;

        // Tracked for every parsed date, so the paginator sees dates before the window too.
        let is_earlier = match earliest.as_deref().and_then(date_value) {
            Some(current) => date_value(&date).is_some_and(|d| d < current),
            None => true,
        };
        if is_earlier {
            *earliest = Some(date.clone());
        }

        if !window.contains(&date) {
            return Ok(None);
        }

        let link = row
            .select(&self.sel.event_link)
            .next()
            .ok_or_else(|| ScrapeError::structure("event URL not found in event row"))?;
        let href = link
            .value()
            .attr("href")
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ScrapeError::structure("event URL not found in event row"))?;
        let name = text_of(link);
        if name.is_empty() {
            return Err(ScrapeError::structure("event name not found in event row"));
        }

        Ok(Some(Event { url: self.event_url(href), date, name }))
    }

    fn deck_from_row(&self, row: ElementRef, num_players: Option<u32>) -> Result<Deck, ScrapeError> {
        let href = row
            .select(&self.sel.deck_link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ScrapeError::structure("deck list URL not found in event deck row"))?;
        let player = row
            .select(&self.sel.player)
            .next()
            .map(text_of)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ScrapeError::structure("player name not found in event deck row"))?;
        let rank = row
            .select(&self.sel.rank)
            .next()
            .map(text_of)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| ScrapeError::structure("deck rank not found in event deck row"))?;

        Ok(Deck {
            url: self.deck_url(href),
            player,
            finish: Finish::new(&rank, num_players),
        })
    }
}

impl PageSchema for Mtgtop8Schema {
    fn listing_url(&self, page: u32) -> String {
        format!(
            "{}/format?f={}&meta={}&cp={}",
            self.base_url, self.format, self.meta, page
        )
    }

    fn extract_events(&self, doc: &Html, window: &DateWindow) -> Result<EventPage, ScrapeError> {
        let table = doc
            .select(&self.sel.event_table)
            .nth(1)
            .ok_or_else(|| ScrapeError::structure("event table not found"))?;

        let mut page = EventPage::default();
        for row in table.select(&self.sel.row) {
            match self.event_from_row(row, window, &mut page.earliest) {
                Ok(Some(event)) => page.events.push(event),
                Ok(None) => {}
                Err(e) => page.skipped.push(e.to_string()),
            }
        }
        Ok(page)
    }

    fn extract_decks(&self, doc: &Html) -> Result<DeckPage, ScrapeError> {
        // e.g. <div style="margin-bottom:5px;">40 players - 06/08/24</div>
        let meta = doc
            .select(&self.sel.event_meta)
            .next()
            .ok_or_else(|| ScrapeError::structure("event metadata block not found"))?;
        let num_players = self
            .players_re
            .captures(&text_of(meta))
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok());

        let nav = doc
            .select(&self.sel.left_nav)
            .next()
            .ok_or_else(|| ScrapeError::structure("left navigation block not found"))?;

        // The top finisher is highlighted with a different class than the rest.
        let chosen = nav
            .select(&self.sel.chosen_row)
            .next()
            .ok_or_else(|| ScrapeError::structure("first deck row not found"))?;

        let mut page = DeckPage { num_players, ..Default::default() };
        for row in std::iter::once(chosen).chain(nav.select(&self.sel.hover_row)) {
            match self.deck_from_row(row, num_players) {
                Ok(deck) => page.decks.push(deck),
                Err(e) => page.skipped.push(e.to_string()),
            }
        }
        Ok(page)
    }

    fn extract_decklist(&self, doc: &Html) -> Result<DecklistText, ScrapeError> {
        let container = doc
            .select(&self.sel.decklist)
            .next()
            .ok_or_else(|| ScrapeError::structure("deck list block not found"))?;

        let mut list = DecklistText::default();
        for group in container.select(&self.sel.card_group) {
            let is_sideboard = group
                .select(&self.sel.group_label)
                .next()
                .is_some_and(|label| text_of(label) == SIDEBOARD_MARKER);
            let target = if is_sideboard { &mut list.sideboard } else { &mut list.maindeck };
            target.extend(group.select(&self.sel.card_line).map(text_of));
        }
        Ok(list)
    }
}
