//! Critical Statistics Invariants:
//!
//! 1. Statistics are ALWAYS derived from the kept cards, NEVER primary
//! 2. Statistics are recomputed for every render job
//! 3. Statistics are never mutated once computed
//! 4. Cards without a resolvable price contribute zero to the total but still count

pub mod entity;
pub use entity::{AggregateStats, StatsAccumulator};
