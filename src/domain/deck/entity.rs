use serde::{Deserialize, Serialize};

use crate::domain::card::CardRecord;

const BASIC_LANDS: [&str; 5] = ["plains", "island", "swamp", "mountain", "forest"];

/// One distinct card name with its summed quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub name: String,
    pub count: u32,
}

/// Parsed card list: distinct names in first-seen order with their counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckList {
    entries: Vec<DeckEntry>,
}

impl DeckList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` copies of `name`, merging with an earlier entry of the same name.
    pub fn add(&mut self, name: &str, count: u32) {
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.count = entry.count.saturating_add(count),
            None => self.entries.push(DeckEntry {
                name: name.to_string(),
                count,
            }),
        }
    }

    pub fn entries(&self) -> &[DeckEntry] {
        &self.entries
    }

    /// Distinct names in first-seen order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    pub fn count_of(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every entry count.
    pub fn total_count(&self) -> u64 {
        self.entries.iter().map(|entry| u64::from(entry.count)).sum()
    }

    /// "count name" lines, the canonical textual form of the list.
    pub fn to_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| format!("{} {}", entry.count, entry.name))
            .collect()
    }
}

/// Which lands are left out of the document and the statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandPolicy {
    #[default]
    None,
    BasicOnly,
    AllLands,
}

impl LandPolicy {
    pub fn excludes(&self, card: &CardRecord) -> bool {
        match self {
            LandPolicy::None => false,
            LandPolicy::BasicOnly => is_basic_land_name(&card.name),
            LandPolicy::AllLands => card.is_land(),
        }
    }
}

pub fn is_basic_land_name(name: &str) -> bool {
    let lowered = name.to_lowercase();
    BASIC_LANDS.contains(&lowered.as_str())
}

/// Whether the full printing list is fetched for each card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintingPolicy {
    #[default]
    Include,
    Exclude,
}

/// Sections emitted into the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    Suggestions,
    Cards,
    #[default]
    Both,
}

impl GenerationMode {
    pub fn includes_summary(&self) -> bool {
        matches!(self, GenerationMode::Suggestions | GenerationMode::Both)
    }

    pub fn includes_cards(&self) -> bool {
        matches!(self, GenerationMode::Cards | GenerationMode::Both)
    }
}
