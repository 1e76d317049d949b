//! Card records as fetched from the card-data service.
//!
//! Records are immutable after fetch and owned by the render job that
//! fetched them. Nothing here performs I/O.

pub mod entity;
pub use entity::{CardRecord, Prices, PriceSummary, PrintingRecord};
