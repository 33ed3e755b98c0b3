use crate::artifact;
use crate::database::{Database, DeckRecord, EventRecord};
use crate::events::{EventSink, UiEvent};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const SOURCE: &str = "mtgtop8";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub events: usize,
    pub decks: usize,
    pub skipped: usize,
}

/// Sorted subdirectories of `dir` whose names pass `keep`.
fn subdirs(dir: &Path, keep: impl Fn(&str) -> bool) -> Result<Vec<(String, PathBuf)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        if keep(&name) {
            dirs.push((name, path));
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn all_digits(len: usize) -> impl Fn(&str) -> bool {
    move |s: &str| s.len() == len && s.chars().all(|c| c.is_ascii_digit())
}

/// Every published event directory as `(YYYY-MM-DD, name, path)`, oldest first.
fn event_dirs(data_dir: &Path) -> Result<Vec<(String, String, PathBuf)>> {
    let mut out = Vec::new();
    for (year, year_path) in subdirs(data_dir, all_digits(4))? {
        for (month, month_path) in subdirs(&year_path, all_digits(2))? {
            for (day, day_path) in subdirs(&month_path, all_digits(2))? {
                for (name, path) in subdirs(&day_path, |_| true)? {
                    out.push((format!("{}-{}-{}", year, month, day), name, path));
                }
            }
        }
    }
    Ok(out)
}

/// Deck records of one event directory, in file index order.
fn read_decks(dir: &Path, sink: &dyn EventSink) -> Result<Vec<DeckRecord>> {
    let mut files: Vec<(usize, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let index = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.split('_').next())
            .and_then(|i| i.parse().ok())
            .unwrap_or(usize::MAX);
        files.push((index, path));
    }
    files.sort();

    let mut decks = Vec::new();
    for (_, path) in files {
        let text = fs::read_to_string(&path).with_context(|| format!("Cannot read {}", path.display()))?;
        match artifact::parse(&text) {
            Some(stored) => decks.push(DeckRecord {
                player: stored.deck.player,
                finish: stored.deck.finish.position(),
                num_players: stored.deck.finish.players(),
                url: stored.deck.url,
                mainboard: stored.list.maindeck.join("\n"),
                sideboard: stored.list.sideboard.join("\n"),
            }),
            None => sink.send(UiEvent::Warn(format!("{}: missing provenance header", path.display()))),
        }
    }
    Ok(decks)
}

/// Load every published event under `data_dir` not already in the database.
pub fn load_tree(db: &mut Database, data_dir: &Path, sink: &dyn EventSink) -> Result<LoadSummary> {
    sink.send(UiEvent::LoadStarted);
    let mut summary = LoadSummary::default();

    for (date, name, path) in event_dirs(data_dir)? {
        sink.check()?;
        if db.find_event(&date, &name)?.is_some() {
            summary.skipped += 1;
            continue;
        }

        let decks = read_decks(&path, sink)?;
        let num_players = decks.iter().find_map(|d| d.num_players);
        let event_type = if decks.iter().all(|d| d.finish.is_none()) { "league" } else { "tournament" };
        let record = EventRecord {
            date,
            name: name.clone(),
            event_type: event_type.into(),
            num_players,
            source: SOURCE.into(),
        };
        db.insert_event(&record, &decks)?;

        summary.events += 1;
        summary.decks += decks.len();
        sink.send(UiEvent::EventLoaded { name, decks: decks.len() });
    }

    sink.send(UiEvent::LoadComplete {
        events: summary.events,
        decks: summary.decks,
        skipped: summary.skipped,
    });
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Deck, DecklistText, Finish};
    use crate::testing::RecordingSink;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn write_deck(dir: &Path, index: usize, player: &str, finish: Finish) {
        let deck = Deck {
            url: format!("https://mtg.test/event?d={}", index),
            player: player.into(),
            finish,
        };
        let list = DecklistText {
            maindeck: vec!["4 Counterspell".into(), "16 Island".into()],
            sideboard: vec!["3 Hydroblast".into()],
        };
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(artifact::deck_file_name(index, &deck)), artifact::render(&deck, &list)).unwrap();
    }

    #[test]
    fn test_load_tree() {
        let tmp = tempdir().unwrap();
        let data = tmp.path().join("data");
        let challenge = data.join("2024/08/17/Pauper_Challenge");
        for (i, player) in ["Alice", "Bob", "Carol"].iter().enumerate() {
            write_deck(&challenge, i, player, Finish::new(&(i + 1).to_string(), Some(32)));
        }
        let league = data.join("2024/08/16/MTGO_League");
        write_deck(&league, 0, "Dave", Finish::Unranked);
        fs::create_dir_all(tmp.path().join("data/notes")).unwrap();

        let mut db = Database::open_in_memory().unwrap();
        let sink = RecordingSink::new();
        let summary = load_tree(&mut db, &data, &sink).unwrap();

        assert_eq!(summary, LoadSummary { events: 2, decks: 4, skipped: 0 });
        let eid = db.find_event("2024-08-17", "Pauper_Challenge").unwrap().unwrap();
        assert_eq!(db.event_players(eid).unwrap(), vec!["Alice", "Bob", "Carol"]);
        assert!(db.find_event("2024-08-16", "MTGO_League").unwrap().is_some());
    }

    #[test]
    fn test_reload_skips_known_events() {
        let tmp = tempdir().unwrap();
        let data = tmp.path().join("data");
        write_deck(&data.join("2024/08/16/MTGO_League"), 0, "Dave", Finish::Unranked);

        let mut db = Database::open_in_memory().unwrap();
        let sink = RecordingSink::new();
        load_tree(&mut db, &data, &sink).unwrap();
        let again = load_tree(&mut db, &data, &sink).unwrap();

        assert_eq!(again, LoadSummary { events: 0, decks: 0, skipped: 1 });
        assert_eq!(db.count_decks().unwrap(), 1);
    }

    #[test]
    fn test_malformed_artifact_is_skipped() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("data/2024/08/16/MTGO_League");
        write_deck(&dir, 0, "Dave", Finish::Unranked);
        fs::write(dir.join("1_-_Eve"), "4 Island\nSIDEBOARD\n").unwrap();

        let mut db = Database::open_in_memory().unwrap();
        let sink = RecordingSink::new();
        let summary = load_tree(&mut db, &tmp.path().join("data"), &sink).unwrap();

        assert_eq!(summary.decks, 1);
        assert_eq!(sink.warnings().len(), 1);
    }

    #[test]
    fn test_missing_data_dir_loads_nothing() {
        let tmp = tempdir().unwrap();
        let mut db = Database::open_in_memory().unwrap();
        let sink = RecordingSink::new();
        let summary = load_tree(&mut db, &tmp.path().join("absent"), &sink).unwrap();
        assert_eq!(summary, LoadSummary::default());
    }
}
