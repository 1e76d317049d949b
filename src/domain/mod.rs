// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// This file MUST declare all domain modules and re-export their public API.
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod card;
pub mod deck;
pub mod layout;
pub mod mechanics;
pub mod statistics;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Card Domain
pub use card::{CardRecord, PriceSummary, Prices, PrintingRecord};

// Deck Domain
pub use deck::{
    is_basic_land_name, validate_deck, DeckEntry, DeckList, GenerationMode, LandPolicy,
    PrintingPolicy,
};

// Statistics Domain (Derived Data)
pub use statistics::{AggregateStats, StatsAccumulator};

// Layout Plan
pub use layout::{DocumentPlan, LayoutBlock, PageLayout, SummaryBlock};

// Mechanics Vocabulary
pub use mechanics::{Mechanic, MechanicsVocabulary};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
