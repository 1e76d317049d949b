// src/services/render_job.rs
//
// Render Job - the whole pipeline for one document.
//
// ARCHITECTURE:
// validate input → check destination → aggregate (network) → advice →
// measure → plan (pure) → render → commit
//
// CRITICAL RULES:
// - The destination is checked before any network work
// - Cancellation yields RenderOutcome::Cancelled, never an error
// - Nothing is written to the destination unless rendering finalized

use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    validate_deck, AggregateStats, GenerationMode, LandPolicy, MechanicsVocabulary, PageLayout,
    PrintingPolicy,
};
use crate::error::{AppError, AppResult};
use crate::events::{EventBus, RenderJobCancelled, RenderJobCompleted, RenderJobStarted};
use crate::infrastructure::DocumentStore;
use crate::integrations::{AdviceProvider, CardCatalog};
use crate::render::{markup, PdfSurface};
use crate::services::cancellation::CancellationToken;
use crate::services::deck_aggregator::DeckAggregator;
use crate::services::document_renderer::{DocumentRenderer, RenderResult, SummaryContent};
use crate::services::layout_planner::{self, LayoutMetrics};
use crate::services::list_parser::parse_list;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub mode: GenerationMode,
    pub lands: LandPolicy,
    pub printings: PrintingPolicy,
    pub layout: PageLayout,
}

#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub list_name: String,
    pub card_list: String,
    pub options: GenerationOptions,
    /// Pre-generated advice; the advice provider is asked when absent.
    pub advice: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    pub job_id: Uuid,
    pub output_path: PathBuf,
    pub pages: usize,
    pub stats: AggregateStats,
    pub skipped: Vec<String>,
    pub excluded: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum RenderOutcome {
    Completed(RenderReport),
    Cancelled { pages_rendered: usize },
}

pub struct RenderJobService {
    catalog: Arc<dyn CardCatalog>,
    advisor: Arc<dyn AdviceProvider>,
    vocabulary: Arc<MechanicsVocabulary>,
    store: DocumentStore,
    event_bus: Arc<EventBus>,
    mana_symbols_dir: PathBuf,
    metrics: LayoutMetrics,
}

impl RenderJobService {
    pub fn new(
        catalog: Arc<dyn CardCatalog>,
        advisor: Arc<dyn AdviceProvider>,
        vocabulary: Arc<MechanicsVocabulary>,
        store: DocumentStore,
        event_bus: Arc<EventBus>,
        mana_symbols_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            catalog,
            advisor,
            vocabulary,
            store,
            event_bus,
            mana_symbols_dir: mana_symbols_dir.into(),
            metrics: LayoutMetrics::default(),
        }
    }

    pub async fn run(
        &self,
        request: RenderRequest,
        cancel: &CancellationToken,
    ) -> AppResult<RenderOutcome> {
        let list_name = request.list_name.trim();
        if list_name.is_empty() {
            return Err(AppError::Validation("A document name is required".to_string()));
        }
        let deck = parse_list(&request.card_list);
        if deck.is_empty() {
            return Err(AppError::Validation(
                "The card list contains no cards".to_string(),
            ));
        }
        validate_deck(&deck)?;

        self.store.ensure_ready()?;
        let output_path = self.store.path_for(list_name);
        let options = request.options;

        let job_id = Uuid::new_v4();
        info!(
            "Render job {} started: '{}' ({} distinct cards, {:?})",
            job_id,
            list_name,
            deck.len(),
            options.mode
        );
        self.event_bus.emit(RenderJobStarted::new(
            job_id,
            list_name.to_string(),
            deck.len(),
            options.mode,
        ));

        let aggregator = DeckAggregator::new(self.catalog.clone(), self.event_bus.clone());
        let aggregation = match aggregator
            .aggregate(job_id, &deck, options.lands, options.printings, cancel)
            .await
        {
            Ok(aggregation) => aggregation,
            Err(AppError::Cancelled) => return Ok(self.cancelled(job_id, 0)),
            Err(e) => return Err(e),
        };

        if options.mode == GenerationMode::Cards && aggregation.cards.is_empty() {
            return Err(AppError::Validation(
                "None of the listed cards could be found".to_string(),
            ));
        }
        if cancel.is_cancelled() {
            return Ok(self.cancelled(job_id, 0));
        }

        let advice = if options.mode.includes_summary() {
            Some(match request.advice {
                Some(text) => text,
                None => self.advisor.advise(&deck, &aggregation.stats).await,
            })
        } else {
            None
        };

        let advice_height = advice
            .as_deref()
            .map(|text| {
                markup::measure(
                    text,
                    self.metrics.advice_font_size,
                    self.metrics.advice_leading,
                    self.metrics.available_width(),
                )
            })
            .unwrap_or(0.0);

        let plan = layout_planner::plan(
            &aggregation.cards,
            options.mode,
            options.printings,
            advice_height,
            &self.metrics,
        );

        let renderer = DocumentRenderer::new(
            self.catalog.clone(),
            self.vocabulary.clone(),
            self.event_bus.clone(),
            self.metrics.clone(),
            self.mana_symbols_dir.clone(),
        );
        let summary = advice.as_deref().map(|advice| SummaryContent {
            stats: &aggregation.stats,
            advice,
        });

        let mut surface = PdfSurface::new();
        let result = renderer
            .render(
                job_id,
                &plan,
                &aggregation.cards,
                summary,
                options.layout,
                &mut surface,
                cancel,
            )
            .await?;

        match result {
            RenderResult::Cancelled { cards_rendered } => Ok(self.cancelled(job_id, cards_rendered)),
            RenderResult::Finalized { pages, .. } => {
                surface.save(&output_path)?;
                info!("Saved {} ({} pages)", output_path.display(), pages);
                if !aggregation.skipped.is_empty() {
                    warn!("Cards without data: {}", aggregation.skipped.join(", "));
                }

                self.event_bus.emit(RenderJobCompleted::new(
                    job_id,
                    output_path.clone(),
                    pages,
                    aggregation.skipped.len(),
                ));

                Ok(RenderOutcome::Completed(RenderReport {
                    job_id,
                    output_path,
                    pages,
                    stats: aggregation.stats,
                    skipped: aggregation.skipped,
                    excluded: aggregation.excluded,
                }))
            }
        }
    }

    fn cancelled(&self, job_id: Uuid, pages_rendered: usize) -> RenderOutcome {
        info!(
            "Render job {} cancelled after {} card page(s); nothing saved",
            job_id, pages_rendered
        );
        self.event_bus
            .emit(RenderJobCancelled::new(job_id, pages_rendered));
        RenderOutcome::Cancelled { pages_rendered }
    }
}
