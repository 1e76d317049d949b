// events/types.rs
//
// All render-job events in the system.
// Each event represents an immutable fact that has already occurred.
//
// CRITICAL RULES:
// - Events are facts, not commands
// - Events are immutable
// - Events carry only the data needed to react
// - No business logic in event types (except derived display helpers)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::domain::{GenerationMode, LandPolicy};

/// Trait that all domain events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

macro_rules! impl_domain_event {
    ($event:ident) => {
        impl DomainEvent for $event {
            fn event_id(&self) -> Uuid { self.event_id }
            fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
            fn event_type(&self) -> &'static str { stringify!($event) }
        }
    };
}

// ============================================================================
// JOB LIFECYCLE EVENTS
// ============================================================================

/// Emitted once the list is parsed and validated, before any network call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderJobStarted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub job_id: Uuid,
    pub list_name: String,
    pub distinct_cards: usize,
    pub mode: GenerationMode,
}

impl RenderJobStarted {
    pub fn new(job_id: Uuid, list_name: String, distinct_cards: usize, mode: GenerationMode) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            job_id,
            list_name,
            distinct_cards,
            mode,
        }
    }
}

impl_domain_event!(RenderJobStarted);

/// Emitted when the document has been written to its destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderJobCompleted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub job_id: Uuid,
    pub output_path: PathBuf,
    pub pages: usize,
    pub skipped: usize,
}

impl RenderJobCompleted {
    pub fn new(job_id: Uuid, output_path: PathBuf, pages: usize, skipped: usize) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            job_id,
            output_path,
            pages,
            skipped,
        }
    }
}

impl_domain_event!(RenderJobCompleted);

/// Emitted when the job observed the cancellation flag; nothing was saved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderJobCancelled {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub job_id: Uuid,
    pub pages_rendered: usize,
}

impl RenderJobCancelled {
    pub fn new(job_id: Uuid, pages_rendered: usize) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            job_id,
            pages_rendered,
        }
    }
}

impl_domain_event!(RenderJobCancelled);

// ============================================================================
// PER-CARD EVENTS
// ============================================================================

/// Emitted when a card name has no data; the batch continues without it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardSkipped {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub job_id: Uuid,
    pub card_name: String,
}

impl CardSkipped {
    pub fn new(job_id: Uuid, card_name: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            job_id,
            card_name,
        }
    }
}

impl_domain_event!(CardSkipped);

/// Emitted when the land policy removes a found card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardExcluded {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub job_id: Uuid,
    pub card_name: String,
    pub policy: LandPolicy,
}

impl CardExcluded {
    pub fn new(job_id: Uuid, card_name: String, policy: LandPolicy) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            job_id,
            card_name,
            policy,
        }
    }
}

impl_domain_event!(CardExcluded);

/// Emitted after each completed card page (the progress signal)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardPageRendered {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub job_id: Uuid,
    pub card_name: String,
    /// Zero-based position of the card in the plan
    pub index: usize,
    pub total: usize,
}

impl CardPageRendered {
    pub fn new(job_id: Uuid, card_name: String, index: usize, total: usize) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            job_id,
            card_name,
            index,
            total,
        }
    }

    /// Completed share of the card pages, 0..=100.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (((self.index + 1) * 100) / self.total).min(100) as u8
    }
}

impl_domain_event!(CardPageRendered);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_names() {
        let job_id = Uuid::new_v4();
        assert_eq!(
            CardSkipped::new(job_id, "Nope".to_string()).event_type(),
            "CardSkipped"
        );
        assert_eq!(RenderJobCancelled::new(job_id, 2).event_type(), "RenderJobCancelled");
    }

    #[test]
    fn test_progress_percent() {
        let job_id = Uuid::new_v4();
        assert_eq!(CardPageRendered::new(job_id, "a".into(), 0, 4).percent(), 25);
        assert_eq!(CardPageRendered::new(job_id, "d".into(), 3, 4).percent(), 100);
        assert_eq!(CardPageRendered::new(job_id, "x".into(), 0, 3).percent(), 33);
    }
}
