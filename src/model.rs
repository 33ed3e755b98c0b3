/// One tournament instance found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub url: String,
    /// Canonical `YYYYMMDD`.
    pub date: String,
    pub name: String,
}

impl Event {
    pub fn year(&self) -> &str {
        self.date.get(0..4).unwrap_or("0000")
    }

    pub fn month(&self) -> &str {
        self.date.get(4..6).unwrap_or("00")
    }

    pub fn day(&self) -> &str {
        self.date.get(6..8).unwrap_or("00")
    }
}

/// Placing of a deck within its event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finish {
    /// `rank` is the site's text, e.g. `1` or `5-8`.
    Ranked { rank: String, players: u32 },
    /// No bracket (leagues).
    Unranked,
}

pub const UNRANKED: &str = "-";

impl Finish {
    pub fn new(rank: &str, players: Option<u32>) -> Self {
        match players {
            Some(players) => Finish::Ranked { rank: rank.to_string(), players },
            None => Finish::Unranked,
        }
    }

    /// Inverse of `Display`, used when reading artifacts back.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.rsplit_once('/') {
            Some((rank, players)) => match players.parse() {
                Ok(players) => Finish::Ranked { rank: rank.to_string(), players },
                Err(_) => Finish::Unranked,
            },
            None => Finish::Unranked,
        }
    }

    /// Leading integer of the rank (`5-8` -> 5).
    pub fn position(&self) -> Option<u32> {
        match self {
            Finish::Ranked { rank, .. } => {
                let digits: String = rank.chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse().ok()
            }
            Finish::Unranked => None,
        }
    }

    pub fn players(&self) -> Option<u32> {
        match self {
            Finish::Ranked { players, .. } => Some(*players),
            Finish::Unranked => None,
        }
    }
}

impl std::fmt::Display for Finish {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Finish::Ranked { rank, players } => write!(f, "{}/{}", rank, players),
            Finish::Unranked => f.write_str(UNRANKED),
        }
    }
}

/// One player's result within an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    pub url: String,
    pub player: String,
    pub finish: Finish,
}

pub const SIDEBOARD_MARKER: &str = "SIDEBOARD";

/// Card lines of one deck, split into maindeck and sideboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecklistText {
    pub maindeck: Vec<String>,
    pub sideboard: Vec<String>,
}

impl DecklistText {
    /// Maindeck lines, the separator line, then sideboard lines.
    /// The separator is emitted even when a section is empty.
    pub fn to_text(&self) -> String {
        [
            self.maindeck.join("\n"),
            SIDEBOARD_MARKER.to_string(),
            self.sideboard.join("\n"),
        ]
        .join("\n")
    }

    pub fn parse(text: &str) -> Self {
        let mut list = DecklistText::default();
        let mut in_sideboard = false;
        for line in text.lines() {
            let line = line.trim();
            if line == SIDEBOARD_MARKER {
                in_sideboard = true;
                continue;
            }
            if line.is_empty() {
                continue;
            }
            if in_sideboard {
                list.sideboard.push(line.to_string());
            } else {
                list.maindeck.push(line.to_string());
            }
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_separator_always_present() {
        let list = DecklistText {
            maindeck: vec!["1 Island".into()],
            sideboard: vec![],
        };
        assert_eq!(list.to_text(), "1 Island\nSIDEBOARD\n");

        let empty = DecklistText::default();
        assert_eq!(empty.to_text(), "\nSIDEBOARD\n");
    }

    #[test]
    fn test_parse_splits_sections() {
        let list = DecklistText::parse("4 Counterspell\n16 Island\nSIDEBOARD\n3 Hydroblast");
        assert_eq!(list.maindeck, vec!["4 Counterspell", "16 Island"]);
        assert_eq!(list.sideboard, vec!["3 Hydroblast"]);
    }

    #[test]
    fn test_finish_display_and_sentinel() {
        assert_eq!(Finish::new("1", Some(40)).to_string(), "1/40");
        assert_eq!(Finish::new("5-8", Some(40)).to_string(), "5-8/40");
        assert_eq!(Finish::new("1", None).to_string(), "-");
        assert_eq!(Finish::new("1", None), Finish::Unranked);
    }

    #[test]
    fn test_finish_parse_and_position() {
        let f = Finish::parse("5-8/40");
        assert_eq!(f.position(), Some(5));
        assert_eq!(f.players(), Some(40));
        assert_eq!(Finish::parse("-"), Finish::Unranked);
        assert_eq!(Finish::Unranked.position(), None);
    }

    #[test]
    fn test_event_date_segments() {
        let e = Event {
            url: "https://example.test/event?e=1".into(),
            date: "20240817".into(),
            name: "MTGO League".into(),
        };
        assert_eq!((e.year(), e.month(), e.day()), ("2024", "08", "17"));
    }
}
