use crate::artifact;
use crate::error::ScrapeError;
use crate::events::{EventSink, UiEvent};
use crate::fetch::Fetch;
use crate::model::{Deck, DecklistText, Event};
use crate::schema::PageSchema;
use crate::staging::StagingDir;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, PartialEq, Eq)]
pub enum PublishResult {
    /// The canonical directory already existed; nothing was fetched.
    AlreadyPublished { path: PathBuf },
    Published { path: PathBuf, saved: usize, attempted: usize },
    /// No deck could be saved; no directory was created.
    Empty { attempted: usize },
}

/// Downloads one event's decks into staging and promotes them in one rename.
pub struct Publisher<'a> {
    fetcher: &'a dyn Fetch,
    schema: &'a dyn PageSchema,
    sink: &'a dyn EventSink,
    data_dir: PathBuf,
    staging_dir: PathBuf,
}

impl<'a> Publisher<'a> {
    pub fn new(
        fetcher: &'a dyn Fetch,
        schema: &'a dyn PageSchema,
        sink: &'a dyn EventSink,
        data_dir: &Path,
        staging_dir: &Path,
    ) -> Self {
        Self {
            fetcher,
            schema,
            sink,
            data_dir: data_dir.to_path_buf(),
            staging_dir: staging_dir.to_path_buf(),
        }
    }

    /// Fetch the event page, extract its decks, then [`Publisher::publish`] them.
    /// An existing canonical directory short-circuits before any request.
    pub fn publish_event(&self, event: &Event) -> Result<PublishResult> {
        let canonical = artifact::event_dir(&self.data_dir, event);
        if canonical.exists() {
            return Ok(PublishResult::AlreadyPublished { path: canonical });
        }

        let doc = self.fetcher.fetch(&event.url)?;
        let page = self.schema.extract_decks(&doc)?;
        if let Some(players) = page.num_players {
            self.sink.send(UiEvent::Log(format!("{}: {} players", event.name, players)));
        }
        for msg in &page.skipped {
            self.sink.send(UiEvent::Warn(format!("{}: {}", event.name, msg)));
        }
        self.publish(event, &page.decks)
    }

    pub fn publish(&self, event: &Event, decks: &[Deck]) -> Result<PublishResult> {
        let canonical = artifact::event_dir(&self.data_dir, event);
        if canonical.exists() {
            return Ok(PublishResult::AlreadyPublished { path: canonical });
        }

        let staging = StagingDir::acquire(self.staging_dir.join(artifact::staging_name(event)))?;
        self.sink.send(UiEvent::DecksFound { count: decks.len() });

        let mut saved = 0;
        for (index, deck) in decks.iter().enumerate() {
            self.sink.check()?;

            let list = match self.fetch_decklist(deck) {
                Ok(list) => list,
                Err(e) => {
                    self.sink.send(UiEvent::DeckFailed {
                        index,
                        player: deck.player.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let path = staging.path().join(artifact::deck_file_name(index, deck));
            fs::write(&path, artifact::render(deck, &list))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            saved += 1;
            self.sink.send(UiEvent::DeckSaved { index, player: deck.player.clone() });
        }

        if staging.promote(&canonical)? {
            Ok(PublishResult::Published { path: canonical, saved, attempted: decks.len() })
        } else {
            Ok(PublishResult::Empty { attempted: decks.len() })
        }
    }

    fn fetch_decklist(&self, deck: &Deck) -> Result<DecklistText, ScrapeError> {
        let doc = self.fetcher.fetch(&deck.url)?;
        self.schema.extract_decklist(&doc)
    }
}
