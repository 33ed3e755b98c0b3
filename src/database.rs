use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// An event directory ready to be inserted.
pub struct EventRecord {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub name: String,
    pub event_type: String,
    pub num_players: Option<u32>,
    pub source: String,
}

pub struct DeckRecord {
    pub player: String,
    /// Leading integer of the rank; None for unranked events.
    pub finish: Option<u32>,
    pub num_players: Option<u32>,
    pub url: String,
    pub mainboard: String,
    pub sideboard: String,
}

/// SQLite store for events and their decks.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_tables()?;
        Ok(db)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let db = Self { conn: Connection::open_in_memory()? };
        db.init_tables()?;
        Ok(db)
    }

    fn init_tables(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

             CREATE TABLE IF NOT EXISTS event (
                 eid INTEGER PRIMARY KEY,
                 date DATE,
                 name TEXT,
                 type TEXT,
                 num_players INTEGER,
                 source TEXT
             );

             CREATE TABLE IF NOT EXISTS deck (
                 did INTEGER PRIMARY KEY,
                 date DATE,
                 player TEXT,
                 finish INTEGER,
                 num_players INTEGER,
                 url TEXT,
                 mainboard TEXT,
                 sideboard TEXT,
                 eid INTEGER,
                 FOREIGN KEY (eid) REFERENCES event (eid)
             );

             CREATE INDEX IF NOT EXISTS idx_event_date_name
                 ON event(date, name);
             CREATE INDEX IF NOT EXISTS idx_deck_eid
                 ON deck(eid);",
        )?;
        Ok(())
    }

    /// Id of an already loaded event with this date and name.
    pub fn find_event(&self, date: &str, name: &str) -> Result<Option<i64>> {
        let eid = self
            .conn
            .query_row(
                "SELECT eid FROM event WHERE date = ?1 AND name = ?2",
                params![date, name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(eid)
    }

    /// Insert an event and all its decks in one transaction. Returns the new event id.
    pub fn insert_event(&mut self, event: &EventRecord, decks: &[DeckRecord]) -> Result<i64> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO event (date, name, type, num_players, source) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![event.date, event.name, event.event_type, event.num_players, event.source],
        )?;
        let eid = tx.last_insert_rowid();

        {
            let mut insert_deck = tx.prepare(
                "INSERT INTO deck (date, player, finish, num_players, url, mainboard, sideboard, eid)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for deck in decks {
                insert_deck.execute(params![
                    event.date,
                    deck.player,
                    deck.finish,
                    deck.num_players,
                    deck.url,
                    deck.mainboard,
                    deck.sideboard,
                    eid
                ])?;
            }
        }

        tx.commit()?;
        Ok(eid)
    }

    pub fn count_events(&self) -> Result<i64> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM event", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn count_decks(&self) -> Result<i64> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM deck", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Players of an event in finishing order (unranked last, then by insertion).
    #[cfg(test)]
    pub fn event_players(&self, eid: i64) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT player FROM deck WHERE eid = ?1 ORDER BY finish IS NULL, finish, did",
        )?;
        let players = stmt
            .query_map([eid], |row| row.get::<_, String>(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(players)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn event() -> EventRecord {
        EventRecord {
            date: "2024-08-17".into(),
            name: "Pauper Challenge".into(),
            event_type: "tournament".into(),
            num_players: Some(40),
            source: "mtgtop8".into(),
        }
    }

    fn deck(player: &str, finish: u32) -> DeckRecord {
        DeckRecord {
            player: player.into(),
            finish: Some(finish),
            num_players: Some(40),
            url: format!("https://mtg.test/event?d={}", finish),
            mainboard: "4 Counterspell".into(),
            sideboard: "3 Hydroblast".into(),
        }
    }

    #[test]
    fn test_insert_and_find_event() {
        let mut db = Database::open_in_memory().unwrap();
        assert_eq!(db.find_event("2024-08-17", "Pauper Challenge").unwrap(), None);

        let eid = db.insert_event(&event(), &[deck("Bob", 2), deck("Alice", 1)]).unwrap();

        assert_eq!(db.find_event("2024-08-17", "Pauper Challenge").unwrap(), Some(eid));
        assert_eq!(db.count_events().unwrap(), 1);
        assert_eq!(db.count_decks().unwrap(), 2);
        assert_eq!(db.event_players(eid).unwrap(), vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_open_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/pauper.db");
        {
            let mut db = Database::open(&path).unwrap();
            db.insert_event(&event(), &[]).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.count_events().unwrap(), 1);
    }
}
