// src/services/document_renderer.rs
//
// Document Renderer - draws a DocumentPlan onto a DrawingSurface.
//
// ARCHITECTURE:
// - Planning → SummaryPage? → CardPage(0..N) → Finalized, enforced by
//   RenderStateMachine; an out-of-order step is a domain error
// - Card assets (localized text, images) are fetched just before the card
//   is drawn, one card at a time
// - Paged layout: one page per block. Continuous: one page of plan height
// - The text column is laid out before drawing; a column taller than the
//   main image grows its block and pushes the printing grid down
//
// CRITICAL RULES:
// - Cancellation is polled only at card boundaries
// - Image and symbol failures degrade the page, never abort the job
// - The renderer never saves; committing the artifact is the caller's call

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use log::{debug, info, warn};
use regex::Regex;
use uuid::Uuid;

use crate::domain::{
    AggregateStats, CardRecord, DocumentPlan, DomainError, DomainResult, LayoutBlock, Mechanic,
    MechanicsVocabulary, PageLayout, PriceSummary,
};
use crate::error::AppResult;
use crate::events::{CardPageRendered, EventBus};
use crate::integrations::catalog::{IMAGE_NORMAL, IMAGE_SMALL};
use crate::integrations::CardCatalog;
use crate::render::markup;
use crate::render::text_metrics::{text_width, wrap_text};
use crate::render::{DrawingSurface, FontStyle, Rect};
use crate::services::cancellation::CancellationToken;
use crate::services::deck_aggregator::KeptCard;
use crate::services::layout_planner::{fit_text_column, LayoutMetrics};

const SUMMARY_TITLE: &str = "Summary and Advice";
const NO_MECHANICS: &str = "No mechanics found.";
const ARTIST_UNAVAILABLE: &str = "Artist not available";

const LABEL_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
const EFFECT_SIZE: f32 = 12.0;
const EFFECT_LEADING: f32 = 14.0;
const SYMBOL_SIZE: f32 = 15.0;
const SYMBOL_SPACING: f32 = 2.0;
const CAPTION_SIZE: f32 = 8.0;
const CAPTION_LEADING: f32 = 10.0;
const STATS_SIZE: f32 = 14.0;
const STATS_LEADING: f32 = 16.8;
/// Distance of the separator line above the bottom of a card block.
const SEPARATOR_LIFT: f32 = 40.0;
const SEPARATOR_INSET: f32 = 30.0;
/// Depth of descenders below a baseline, as a fraction of the font size.
const DESCENT_RATIO: f32 = 0.25;

// ============================================================================
// STATE MACHINE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Planning,
    SummaryPage,
    CardPage(usize),
    Finalized,
}

#[derive(Debug)]
pub struct RenderStateMachine {
    state: RenderState,
    card_total: usize,
}

impl RenderStateMachine {
    pub fn new(card_total: usize) -> Self {
        Self {
            state: RenderState::Planning,
            card_total,
        }
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Moves to `next`. Card pages are strictly sequential and every
    /// planned card page must be drawn before finalizing.
    pub fn advance(&mut self, next: RenderState) -> DomainResult<()> {
        use RenderState::*;

        let allowed = match (self.state, next) {
            (Planning, SummaryPage) => true,
            (Planning, CardPage(0)) | (SummaryPage, CardPage(0)) => self.card_total > 0,
            (CardPage(current), CardPage(following)) => {
                following == current + 1 && following < self.card_total
            }
            (Planning, Finalized) | (SummaryPage, Finalized) => self.card_total == 0,
            (CardPage(current), Finalized) => current + 1 == self.card_total,
            _ => false,
        };

        if !allowed {
            return Err(DomainError::InvalidStateTransition(format!(
                "{:?} -> {:?} ({} card pages planned)",
                self.state, next, self.card_total
            )));
        }
        self.state = next;
        Ok(())
    }
}

// ============================================================================
// RENDERER
// ============================================================================

/// Inputs of the summary section.
#[derive(Debug, Clone, Copy)]
pub struct SummaryContent<'a> {
    pub stats: &'a AggregateStats,
    pub advice: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderResult {
    Finalized { pages: usize, cards_rendered: usize },
    Cancelled { cards_rendered: usize },
}

/// One drawing step of the text column. Positions are relative to the
/// column's left edge and the top of the card block.
enum ColumnItem<'a> {
    Text {
        dx: f32,
        baseline: f32,
        size: f32,
        style: FontStyle,
        text: String,
    },
    ManaCost {
        baseline: f32,
        mana_cost: &'a str,
    },
    Mechanic {
        dx: f32,
        baseline: f32,
        width: f32,
        mechanic: &'a Mechanic,
    },
}

impl ColumnItem<'_> {
    fn text(dx: f32, baseline: f32, size: f32, style: FontStyle, text: impl Into<String>) -> Self {
        ColumnItem::Text {
            dx,
            baseline,
            size,
            style,
            text: text.into(),
        }
    }

    /// Lowest point the item reaches.
    fn bottom(&self) -> f32 {
        match self {
            ColumnItem::Text { baseline, size, .. } => baseline + size * DESCENT_RATIO,
            ColumnItem::ManaCost { baseline, .. } => baseline + SYMBOL_SIZE * DESCENT_RATIO,
            ColumnItem::Mechanic { baseline, .. } => baseline + BODY_SIZE * DESCENT_RATIO,
        }
    }
}

struct TextColumn<'a> {
    items: Vec<ColumnItem<'a>>,
    /// Offset of the lowest drawn point from the top of the card block.
    bottom: f32,
}

/// Assets fetched for one card right before it is drawn.
struct CardAssets {
    localized_text: String,
    prices: PriceSummary,
    main_image: Option<PathBuf>,
    printing_images: Vec<Option<PathBuf>>,
}

fn mana_symbol_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([^}]+)\}").expect("valid mana symbol regex"))
}

pub struct DocumentRenderer {
    catalog: Arc<dyn CardCatalog>,
    vocabulary: Arc<MechanicsVocabulary>,
    event_bus: Arc<EventBus>,
    metrics: LayoutMetrics,
    mana_symbols_dir: PathBuf,
}

impl DocumentRenderer {
    pub fn new(
        catalog: Arc<dyn CardCatalog>,
        vocabulary: Arc<MechanicsVocabulary>,
        event_bus: Arc<EventBus>,
        metrics: LayoutMetrics,
        mana_symbols_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            catalog,
            vocabulary,
            event_bus,
            metrics,
            mana_symbols_dir: mana_symbols_dir.into(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn render<S: DrawingSurface + Send>(
        &self,
        job_id: Uuid,
        plan: &DocumentPlan,
        cards: &[KeptCard],
        summary: Option<SummaryContent<'_>>,
        layout: PageLayout,
        surface: &mut S,
        cancel: &CancellationToken,
    ) -> AppResult<RenderResult> {
        if plan.blocks.len() != cards.len() && plan.mode.includes_cards() {
            return Err(DomainError::InvariantViolation(format!(
                "plan has {} card blocks for {} cards",
                plan.blocks.len(),
                cards.len()
            ))
            .into());
        }

        let mut machine = RenderStateMachine::new(plan.blocks.len());
        let mut cursor = 0.0;
        if layout == PageLayout::Continuous {
            surface.begin_page(plan.page_width, plan.total_height)?;
        }

        if let Some(block) = &plan.summary {
            machine.advance(RenderState::SummaryPage)?;
            let content = summary.ok_or_else(|| {
                DomainError::InvariantViolation("summary planned without content".to_string())
            })?;
            let drawn_height = self.metrics.summary_base_height + block.advice_height;
            let origin = start_block(
                surface,
                layout,
                plan.page_width,
                block.total_height,
                drawn_height,
                &mut cursor,
            )?;
            self.draw_summary(surface, origin, plan.page_width, content)?;
            debug!("Summary drawn ({} pt of advice)", block.advice_height);
        }

        let total = plan.blocks.len();
        for (index, (block, card)) in plan.blocks.iter().zip(cards).enumerate() {
            if cancel.is_cancelled() {
                info!("Render cancelled before card {} of {}", index + 1, total);
                return Ok(RenderResult::Cancelled {
                    cards_rendered: index,
                });
            }
            machine.advance(RenderState::CardPage(index))?;

            let assets = self.gather_assets(card, block).await;
            let column = self.layout_text_column(block.header_height, &card.record, &assets);
            let fitted = fit_text_column(block, column.bottom);
            if fitted.total_height > block.total_height {
                debug!(
                    "Text column of '{}' grows its block by {} pt",
                    card.record.name,
                    fitted.total_height - block.total_height
                );
            }
            let origin = start_block(
                surface,
                layout,
                plan.page_width,
                fitted.total_height,
                fitted.total_height,
                &mut cursor,
            )?;
            self.draw_card(surface, origin, plan.page_width, &fitted, card, &column, &assets)?;

            self.event_bus.emit(CardPageRendered::new(
                job_id,
                card.record.name.clone(),
                index,
                total,
            ));
        }

        machine.advance(RenderState::Finalized)?;
        Ok(RenderResult::Finalized {
            pages: surface.page_count(),
            cards_rendered: total,
        })
    }

    async fn gather_assets(&self, card: &KeptCard, block: &LayoutBlock) -> CardAssets {
        let record = &card.record;
        let localized_text = self.catalog.localized_text(record).await;
        let prices = self.catalog.price_summary(record);

        let main_image = match &record.image_uri {
            Some(uri) => self.catalog.fetch_image(uri, &record.name, IMAGE_NORMAL).await,
            None => None,
        };

        let mut printing_images = Vec::with_capacity(block.printing_count);
        for printing in card.printings.iter().take(block.printing_count) {
            let path = match &printing.small_image_uri {
                Some(uri) => self.catalog.fetch_image(uri, &printing.id, IMAGE_SMALL).await,
                None => None,
            };
            printing_images.push(path);
        }

        CardAssets {
            localized_text,
            prices,
            main_image,
            printing_images,
        }
    }

    // ========================================================================
    // SUMMARY
    // ========================================================================

    fn draw_summary<S: DrawingSurface>(
        &self,
        surface: &mut S,
        origin: f32,
        page_width: f32,
        content: SummaryContent<'_>,
    ) -> AppResult<()> {
        let m = &self.metrics;

        let title_width = surface.text_width(SUMMARY_TITLE, 20.0, FontStyle::Bold);
        surface.draw_text(
            (page_width - title_width) / 2.0,
            origin + 50.0,
            20.0,
            FontStyle::Bold,
            SUMMARY_TITLE,
        )?;

        for (i, line) in content.stats.summary_lines().iter().enumerate() {
            let baseline = origin + 80.0 + i as f32 * STATS_LEADING;
            surface.draw_text(m.margin_left, baseline, STATS_SIZE, FontStyle::Regular, line)?;
        }

        let rows = markup::layout(
            &markup::translate(content.advice),
            m.advice_font_size,
            m.available_width(),
        );
        let advice_top = origin + m.summary_base_height;
        for (i, row) in rows.iter().enumerate() {
            let baseline = advice_top + m.advice_font_size + i as f32 * m.advice_leading;
            for (x, span) in &row.runs {
                surface.draw_text(
                    m.margin_left + x,
                    baseline,
                    m.advice_font_size,
                    span.style,
                    &span.text,
                )?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // CARD PAGE
    // ========================================================================

    /// Lays out effect text, prices, mana cost, artist and mechanics with the
    /// same wrapping the drawing uses.
    fn layout_text_column<'a>(
        &'a self,
        header_height: f32,
        record: &'a CardRecord,
        assets: &CardAssets,
    ) -> TextColumn<'a> {
        let column_width = self.metrics.text_column_width();
        let mut items = Vec::new();
        let mut y = header_height + 20.0;

        items.push(label(y, "Effect:"));
        y += 15.0;
        let effect = wrap_text(&assets.localized_text, EFFECT_SIZE, FontStyle::Regular, column_width);
        let effect_rows = effect.len();
        for (i, line) in effect.into_iter().enumerate() {
            let baseline = y + EFFECT_SIZE + i as f32 * EFFECT_LEADING;
            items.push(ColumnItem::text(0.0, baseline, EFFECT_SIZE, FontStyle::Regular, line));
        }
        y += effect_rows as f32 * EFFECT_LEADING + 15.0;

        items.push(label(y, "Price:"));
        y += 15.0;
        let price_lines = assets.prices.lines();
        let single_price_line = price_lines.len() == 1;
        for line in price_lines {
            items.push(ColumnItem::text(0.0, y, BODY_SIZE, FontStyle::Regular, line));
            y += 15.0;
        }
        if single_price_line {
            y += 15.0;
        }

        if !record.mana_cost.is_empty() {
            items.push(label(y, "Mana cost:"));
            y += 20.0;
            items.push(ColumnItem::ManaCost {
                baseline: y,
                mana_cost: &record.mana_cost,
            });
            y += 20.0;
        }

        items.push(label(y, "Artist:"));
        y += 15.0;
        let artist = if record.artist.trim().is_empty() {
            ARTIST_UNAVAILABLE
        } else {
            record.artist.as_str()
        };
        items.push(ColumnItem::text(0.0, y, BODY_SIZE, FontStyle::Regular, artist));
        y += 20.0;

        items.push(label(y, "Mechanics:"));
        y += 25.0;
        self.layout_mechanics(&mut items, y, column_width, &record.oracle_text);

        let bottom = items.iter().map(ColumnItem::bottom).fold(0.0, f32::max);
        TextColumn { items, bottom }
    }

    /// Matched mechanic names separated by commas, wrapping within the column.
    fn layout_mechanics<'a>(
        &'a self,
        items: &mut Vec<ColumnItem<'a>>,
        baseline: f32,
        column_width: f32,
        oracle_text: &str,
    ) {
        let found = self.vocabulary.scan(oracle_text);
        if found.is_empty() {
            items.push(ColumnItem::text(0.0, baseline, BODY_SIZE, FontStyle::Regular, NO_MECHANICS));
            return;
        }

        let separator = ", ";
        let separator_width = text_width(separator, BODY_SIZE, FontStyle::Regular);
        let mut dx = 0.0;
        let mut baseline = baseline;

        for (i, mechanic) in found.iter().copied().enumerate() {
            let width = text_width(&mechanic.name, BODY_SIZE, FontStyle::Regular);
            if dx > 0.0 && dx + width > column_width {
                dx = 0.0;
                baseline += BODY_SIZE + 2.0;
            }

            items.push(ColumnItem::Mechanic {
                dx,
                baseline,
                width,
                mechanic,
            });
            dx += width;

            if i + 1 < found.len() {
                items.push(ColumnItem::text(dx, baseline, BODY_SIZE, FontStyle::Regular, separator));
                dx += separator_width;
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_card<S: DrawingSurface>(
        &self,
        surface: &mut S,
        origin: f32,
        page_width: f32,
        block: &LayoutBlock,
        card: &KeptCard,
        column: &TextColumn<'_>,
        assets: &CardAssets,
    ) -> AppResult<()> {
        let m = &self.metrics;
        let record = &card.record;

        surface.draw_text(
            m.margin_left,
            origin + m.header_top_margin,
            m.header_font_size,
            FontStyle::Bold,
            &record.name,
        )?;

        if let Some(path) = &assets.main_image {
            let frame = Rect::new(
                m.margin_left,
                origin + block.header_height,
                m.main_image_width,
                m.main_image_height,
            );
            draw_image_best_effort(surface, path, frame, &record.name);
        }

        self.draw_text_column(surface, origin, column)?;
        self.draw_printing_grid(surface, origin, block, card, assets)?;

        let separator_y = origin + block.total_height - SEPARATOR_LIFT;
        surface.draw_line(
            SEPARATOR_INSET,
            separator_y,
            page_width - SEPARATOR_INSET,
            separator_y,
            1.0,
        )?;
        Ok(())
    }

    fn draw_text_column<S: DrawingSurface>(
        &self,
        surface: &mut S,
        origin: f32,
        column: &TextColumn<'_>,
    ) -> AppResult<()> {
        let x = self.metrics.text_column_x();
        for item in &column.items {
            match item {
                ColumnItem::Text {
                    dx,
                    baseline,
                    size,
                    style,
                    text,
                } => surface.draw_text(x + dx, origin + baseline, *size, *style, text)?,
                ColumnItem::ManaCost {
                    baseline,
                    mana_cost,
                } => self.draw_mana_cost(surface, x, origin + baseline, mana_cost)?,
                ColumnItem::Mechanic {
                    dx,
                    baseline,
                    width,
                    mechanic,
                } => {
                    let (left, baseline) = (x + dx, origin + baseline);
                    surface.draw_text(left, baseline, BODY_SIZE, FontStyle::Regular, &mechanic.name)?;
                    surface.annotate(
                        Rect::new(left, baseline - BODY_SIZE, *width, BODY_SIZE + 2.0),
                        &mechanic.name,
                        &mechanic.description,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// One symbol image per `{X}` token, with the symbol text as fallback.
    /// `bottom` is the baseline of the symbol row.
    fn draw_mana_cost<S: DrawingSurface>(
        &self,
        surface: &mut S,
        x: f32,
        bottom: f32,
        mana_cost: &str,
    ) -> AppResult<()> {
        let mut x = x;
        for captures in mana_symbol_pattern().captures_iter(mana_cost) {
            let symbol = &captures[1];
            let path = self.symbol_path(symbol);
            let frame = Rect::new(x, bottom - SYMBOL_SIZE, SYMBOL_SIZE, SYMBOL_SIZE);

            let drawn = path.is_file() && {
                match surface.draw_image(&path, frame) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("Mana symbol {} unusable ({}); drawing text", symbol, e);
                        false
                    }
                }
            };
            if !drawn {
                debug!("No asset for mana symbol {}", symbol);
                surface.draw_text(x, bottom, SYMBOL_SIZE, FontStyle::Regular, symbol)?;
            }
            x += SYMBOL_SIZE + SYMBOL_SPACING;
        }
        Ok(())
    }

    fn symbol_path(&self, symbol: &str) -> PathBuf {
        self.mana_symbols_dir
            .join(format!("{}.png", symbol.replace('/', "")))
    }

    fn draw_printing_grid<S: DrawingSurface>(
        &self,
        surface: &mut S,
        origin: f32,
        block: &LayoutBlock,
        card: &KeptCard,
        assets: &CardAssets,
    ) -> AppResult<()> {
        if block.printing_grid_rows == 0 {
            return Ok(());
        }
        let m = &self.metrics;
        let usd_to_eur = self.catalog.usd_to_eur();
        let columns = block.printing_grid_columns.max(1);
        let grid_top = origin + block.header_height + block.body_height + block.grid_top_margin;

        for (i, printing) in card.printings.iter().take(block.printing_count).enumerate() {
            let column = i % columns;
            let row = i / columns;
            let x = m.margin_left + column as f32 * (m.grid_cell_width + m.grid_spacing_x);
            let y = grid_top + row as f32 * (m.grid_cell_height + m.grid_spacing_y);

            if let Some(Some(path)) = assets.printing_images.get(i) {
                let frame = Rect::new(x, y, m.grid_cell_width, m.grid_cell_height);
                draw_image_best_effort(surface, path, frame, &card.record.name);
            }

            let caption = printing.caption(usd_to_eur);
            let lines = wrap_text(
                &caption,
                CAPTION_SIZE,
                FontStyle::Regular,
                m.grid_cell_width - 10.0,
            );
            for (line_index, line) in lines.iter().enumerate() {
                let baseline = y + m.grid_cell_height + CAPTION_SIZE + line_index as f32 * CAPTION_LEADING;
                surface.draw_text(x + 5.0, baseline, CAPTION_SIZE, FontStyle::Regular, line)?;
            }
        }
        Ok(())
    }
}

/// Returns the top of the next block. Paged layouts open a page of
/// `page_height`; continuous layouts move the cursor by `advance`.
fn start_block<S: DrawingSurface>(
    surface: &mut S,
    layout: PageLayout,
    page_width: f32,
    page_height: f32,
    advance: f32,
    cursor: &mut f32,
) -> AppResult<f32> {
    match layout {
        PageLayout::Paged => {
            surface.begin_page(page_width, page_height)?;
            Ok(0.0)
        }
        PageLayout::Continuous => {
            let origin = *cursor;
            *cursor += advance;
            Ok(origin)
        }
    }
}

fn label(baseline: f32, text: &str) -> ColumnItem<'static> {
    ColumnItem::text(0.0, baseline, LABEL_SIZE, FontStyle::Bold, text)
}

fn draw_image_best_effort<S: DrawingSurface>(surface: &mut S, path: &Path, frame: Rect, card_name: &str) {
    if let Err(e) = surface.draw_image(path, frame) {
        warn!(
            "Could not draw {} for '{}': {}",
            path.display(),
            card_name,
            e
        );
    }
}
