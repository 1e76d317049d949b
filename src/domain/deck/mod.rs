//! Deck lists and the per-job generation options.
//!
//! Critical Deck Invariants:
//!
//! 1. Every entry has a non-empty, trimmed name
//! 2. Every entry count is >= 1
//! 3. Names are unique (exact, case-sensitive comparison)
//! 4. Entries keep the order in which names were first seen

pub mod entity;
pub mod invariants;

pub use entity::{is_basic_land_name, DeckEntry, DeckList, GenerationMode, LandPolicy, PrintingPolicy};
pub use invariants::validate_deck;
