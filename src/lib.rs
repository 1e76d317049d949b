// src/lib.rs
// manaprint - Deck lists to printable card sheets
//
// Architecture:
// - Domain-centric: deck, card, statistics and layout types live in domain
// - Event-driven: render jobs report progress through the event bus
// - Explicit: every network call goes through one rate-limited client
// - Application Layer: CLI boundary

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod infrastructure;
pub mod integrations;
pub mod render;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    validate_deck,
    AggregateStats,
    // Card
    CardRecord,
    // Deck
    DeckEntry,
    DeckList,
    // Layout
    DocumentPlan,
    DomainError,
    GenerationMode,
    LandPolicy,
    LayoutBlock,
    // Mechanics
    MechanicsVocabulary,
    PageLayout,
    PrintingPolicy,
    PrintingRecord,
};

// ============================================================================
// PUBLIC API - Configuration and Errors
// ============================================================================

pub use config::{AdviceConfig, AppConfig, RateLimitPolicy};
pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus,
    CardExcluded,
    CardPageRendered,
    CardSkipped,
    DomainEvent,
    EventBus,
    EventLogEntry,
    RenderJobCancelled,
    RenderJobCompleted,
    RenderJobStarted,
};

// ============================================================================
// PUBLIC API - Integrations and Rendering
// ============================================================================

pub use infrastructure::{DocumentStore, ImageCache};
pub use integrations::{AdviceProvider, CardCatalog, RateLimitedClient, ScryfallGateway};
pub use render::{DrawingSurface, PdfSurface};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    parse_list,
    CancellationToken,
    DeckAggregator,
    DocumentRenderer,
    GenerationOptions,
    LayoutMetrics,
    MechanicsService,
    RenderJobService,
    RenderOutcome,
    RenderReport,
    RenderRequest,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::AppState;

pub use application::commands;
pub use application::dto;
