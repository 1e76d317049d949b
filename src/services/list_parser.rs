// src/services/list_parser.rs
//
// Free-form card list → DeckList.
//
// RULES:
// - One entry per line, blank lines ignored
// - "<count> <name>" or just "<name>" (count 1)
// - Names are trimmed and compared exactly; counts of repeated names add up
// - First-seen order is kept

use std::sync::OnceLock;

use log::warn;
use regex::Regex;

use crate::domain::DeckList;

fn entry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)\s+(.+)$").expect("valid list entry regex"))
}

pub fn parse_list(text: &str) -> DeckList {
    let mut deck = DeckList::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let (count, name) = match entry_pattern().captures(line) {
            Some(captures) => {
                let quantity = captures.get(1).map_or("", |m| m.as_str());
                let name = captures.get(2).map_or("", |m| m.as_str()).trim();
                match quantity.parse::<u32>() {
                    Ok(count) => (count, name),
                    Err(_) => {
                        warn!("Ignoring '{}': quantity {} is out of range", name, quantity);
                        continue;
                    }
                }
            }
            None => (1, line),
        };

        if count == 0 {
            warn!("Ignoring '{}': quantity is zero", name);
            continue;
        }
        deck.add(name, count);
    }

    deck
}
