use super::entity::DeckList;
use crate::domain::{DomainError, DomainResult};

/// Validates all DeckList invariants
pub fn validate_deck(deck: &DeckList) -> DomainResult<()> {
    let mut seen = std::collections::HashSet::new();
    for entry in deck.entries() {
        if entry.name.trim().is_empty() || entry.name.trim() != entry.name {
            return Err(DomainError::InvariantViolation(format!(
                "Deck entry name must be trimmed and non-empty: '{}'",
                entry.name
            )));
        }
        if entry.count == 0 {
            return Err(DomainError::InvariantViolation(format!(
                "Deck entry '{}' has a zero count",
                entry.name
            )));
        }
        if !seen.insert(entry.name.as_str()) {
            return Err(DomainError::InvariantViolation(format!(
                "Deck entry '{}' appears twice",
                entry.name
            )));
        }
    }
    Ok(())
}
