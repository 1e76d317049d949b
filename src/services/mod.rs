// src/services/mod.rs
//
// Services Module - Orchestration Layer
//
// list_parser → deck_aggregator → layout_planner → document_renderer,
// driven end to end by render_job.

pub mod cancellation;
pub mod deck_aggregator;
pub mod document_renderer;
pub mod layout_planner;
pub mod list_parser;
pub mod mechanics_service;
pub mod render_job;

#[cfg(test)]
pub(crate) mod fake_catalog;


pub use cancellation::CancellationToken;

pub use deck_aggregator::{Aggregation, DeckAggregator, KeptCard};

pub use document_renderer::{
    DocumentRenderer,
    RenderResult,
    RenderState,
    RenderStateMachine,
    SummaryContent,
};

pub use layout_planner::{grid_rows, plan, LayoutMetrics};

pub use list_parser::parse_list;

pub use mechanics_service::{MechanicExplanation, MechanicsReport, MechanicsService};

pub use render_job::{
    GenerationOptions,
    RenderJobService,
    RenderOutcome,
    RenderReport,
    RenderRequest,
};
