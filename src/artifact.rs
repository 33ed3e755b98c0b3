//! On-disk layout: `<data>/<YYYY>/<MM>/<DD>/<event>/<index>_<finish>_<player>`,
//! each file a three-line provenance header followed by the decklist.

use crate::model::{Deck, DecklistText, Event, Finish};
use std::path::{Path, PathBuf};

const URL_HEADER: &str = "// URL: ";
const PLAYER_HEADER: &str = "// PLAYER: ";
const FINISH_HEADER: &str = "// FINISH: ";

fn strip_quotes(s: &str) -> String {
    s.chars().filter(|c| *c != '\'' && *c != '"').collect()
}

/// Stands in for event names that sanitise to nothing usable as a directory.
const UNNAMED_EVENT: &str = "event";

/// Directory-safe event name: whitespace and `/` become `_`, quotes are dropped.
/// Never empty and never `.` or `..`, so the result is always one path segment below the day.
pub fn sanitize_event_name(name: &str) -> String {
    let clean: String = strip_quotes(name.trim())
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' { '_' } else { c })
        .collect();
    match clean.as_str() {
        "" | "." | ".." => UNNAMED_EVENT.to_string(),
        _ => clean,
    }
}

pub fn sanitize_player(player: &str) -> String {
    strip_quotes(player.trim())
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' { '-' } else { c })
        .collect()
}

pub fn event_dir(data_dir: &Path, event: &Event) -> PathBuf {
    data_dir
        .join(event.year())
        .join(event.month())
        .join(event.day())
        .join(sanitize_event_name(&event.name))
}

/// Staging directory name; includes the date so same-named events never share one.
pub fn staging_name(event: &Event) -> String {
    format!("{}_{}", event.date, sanitize_event_name(&event.name))
}

pub fn deck_file_name(index: usize, deck: &Deck) -> String {
    let finish = deck.finish.to_string().replace('/', ":");
    format!("{}_{}_{}", index, finish, sanitize_player(&deck.player))
}

pub fn render(deck: &Deck, list: &DecklistText) -> String {
    format!(
        "{}{}\n{}{}\n{}{}\n{}",
        URL_HEADER,
        deck.url,
        PLAYER_HEADER,
        deck.player,
        FINISH_HEADER,
        deck.finish,
        list.to_text()
    )
}

/// An artifact read back from disk.
#[derive(Debug, PartialEq, Eq)]
pub struct StoredDeck {
    pub deck: Deck,
    pub list: DecklistText,
}

/// Parse a rendered artifact. `None` when the provenance header is incomplete.
pub fn parse(text: &str) -> Option<StoredDeck> {
    let mut lines = text.splitn(4, '\n');
    let url = lines.next()?.strip_prefix(URL_HEADER)?.trim();
    let player = lines.next()?.strip_prefix(PLAYER_HEADER)?.trim();
    let finish = lines.next()?.strip_prefix(FINISH_HEADER)?.trim();
    let body = lines.next().unwrap_or("");

    Some(StoredDeck {
        deck: Deck {
            url: url.to_string(),
            player: player.to_string(),
            finish: Finish::parse(finish),
        },
        list: DecklistText::parse(body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn event(name: &str) -> Event {
        Event {
            url: "https://mtg.test/event?e=1".into(),
            date: "20240817".into(),
            name: name.into(),
        }
    }

    #[test]
    fn test_event_dir_layout() {
        let dir = event_dir(Path::new("data"), &event(" MTGO League 2/3 "));
        assert_eq!(dir, PathBuf::from("data/2024/08/17/MTGO_League_2_3"));
    }

    #[test]
    fn test_sanitize_strips_quotes() {
        assert_eq!(sanitize_event_name(r#"Pauper "Cup" at Jo's"#), "Pauper_Cup_at_Jos");
        assert_eq!(sanitize_player("O'Brien / Smith"), "OBrien---Smith");
    }

    #[test]
    fn test_degenerate_event_names_stay_inside_day() {
        assert_eq!(sanitize_event_name(r#"'""'"#), "event");
        assert_eq!(sanitize_event_name(".."), "event");
        assert_eq!(sanitize_event_name(" . "), "event");
        assert_eq!(
            event_dir(Path::new("data"), &event("..")),
            PathBuf::from("data/2024/08/17/event")
        );
        assert_eq!(sanitize_event_name("...League"), "...League");
    }

    #[test]
    fn test_deck_file_name() {
        let ranked = Deck {
            url: "u".into(),
            player: "Jane Doe".into(),
            finish: Finish::new("5-8", Some(40)),
        };
        assert_eq!(deck_file_name(4, &ranked), "4_5-8:40_Jane-Doe");

        let league = Deck { finish: Finish::Unranked, ..ranked };
        assert_eq!(deck_file_name(0, &league), "0_-_Jane-Doe");
    }

    #[test]
    fn test_render_then_parse() {
        let deck = Deck {
            url: "https://mtg.test/event?e=1&d=2".into(),
            player: "Jane Doe".into(),
            finish: Finish::new("1", Some(40)),
        };
        let list = DecklistText {
            maindeck: vec!["4 Counterspell".into()],
            sideboard: vec!["3 Hydroblast".into()],
        };
        let text = render(&deck, &list);
        assert_eq!(
            text,
            "// URL: https://mtg.test/event?e=1&d=2\n// PLAYER: Jane Doe\n// FINISH: 1/40\n4 Counterspell\nSIDEBOARD\n3 Hydroblast"
        );
        assert_eq!(parse(&text), Some(StoredDeck { deck, list }));
    }

    #[test]
    fn test_parse_rejects_missing_header() {
        assert_eq!(parse("4 Island\nSIDEBOARD\n"), None);
    }
}
