// src/events/mod.rs
//
// Internal Event System - Public API
//
// Render jobs emit their lifecycle here; the command layer subscribes to
// turn CardPageRendered into user-visible progress.

pub mod bus;
pub mod types;

// ============================================================================
// PUBLIC EXPORTS - Event Types and Bus Only
// ============================================================================

pub use types::DomainEvent;

pub use types::{
    // Per card
    CardExcluded,
    CardPageRendered,
    CardSkipped,

    // Job lifecycle
    RenderJobCancelled,
    RenderJobCompleted,
    RenderJobStarted,
};

pub use bus::{EventBus, EventLogEntry};

/// Initialize a new event bus
pub fn create_event_bus() -> EventBus {
    EventBus::new()
}
