// src/services/layout_planner.rs
//
// Layout Planner - computes every block height before the first draw call.
//
// ARCHITECTURE:
// - Pure: no I/O, no clock, same input → same plan
// - Card blocks use a fixed formula (header + image + grid + bottom margin)
// - A card's text column, measured once its assets are known, can only
//   grow the block (fit_text_column)
// - The summary block uses the measured advice height
//
// The renderer reads its geometry from the same LayoutMetrics, so a plan
// and the drawing it drives can never disagree.

use crate::domain::{DocumentPlan, GenerationMode, LayoutBlock, PrintingPolicy, SummaryBlock};
use crate::services::deck_aggregator::KeptCard;

/// Fixed geometry of the single document template, in points.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutMetrics {
    pub page_width: f32,
    pub margin_left: f32,
    pub margin_right: f32,

    pub header_top_margin: f32,
    pub header_font_size: f32,
    pub header_gap: f32,

    pub main_image_width: f32,
    pub main_image_height: f32,
    /// Gap between the main image and the text column.
    pub text_column_gap: f32,

    pub grid_cell_width: f32,
    pub grid_cell_height: f32,
    pub grid_spacing_x: f32,
    pub grid_spacing_y: f32,
    pub grid_top_margin: f32,

    pub margin_bottom: f32,

    /// Height of the summary section before the advice text starts.
    pub summary_base_height: f32,
    pub summary_padding: f32,
    pub advice_font_size: f32,
    pub advice_leading: f32,

    /// Extra height of a continuous document when it contains card blocks.
    pub cards_slack: f32,
    /// Extra height of a summary-only continuous document.
    pub summary_slack: f32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            // US letter width
            page_width: 612.0,
            margin_left: 50.0,
            margin_right: 50.0,
            header_top_margin: 20.0,
            header_font_size: 16.0,
            header_gap: 10.0,
            main_image_width: 200.0,
            main_image_height: 280.0,
            text_column_gap: 20.0,
            grid_cell_width: 90.0,
            grid_cell_height: 110.0,
            grid_spacing_x: 15.0,
            grid_spacing_y: 35.0,
            grid_top_margin: 20.0,
            margin_bottom: 100.0,
            summary_base_height: 180.0,
            summary_padding: 200.0,
            advice_font_size: 12.0,
            advice_leading: 14.0,
            cards_slack: 800.0,
            summary_slack: 200.0,
        }
    }
}

impl LayoutMetrics {
    pub fn header_height(&self) -> f32 {
        self.header_top_margin + self.header_font_size + self.header_gap
    }

    pub fn available_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Printing grid columns that fit the available width (at least one).
    pub fn grid_columns(&self) -> usize {
        let pitch = self.grid_cell_width + self.grid_spacing_x;
        (((self.available_width() + self.grid_spacing_x) / pitch).floor() as usize).max(1)
    }

    /// Left edge of the text column next to the main image.
    pub fn text_column_x(&self) -> f32 {
        self.margin_left + self.main_image_width + self.text_column_gap
    }

    pub fn text_column_width(&self) -> f32 {
        self.page_width - self.text_column_x() - self.margin_right
    }

    /// Height of the summary section for an advice text of `advice_height`.
    pub fn summary_height(&self, advice_height: f32) -> f32 {
        let content = self.summary_base_height - 20.0 + advice_height;
        content.max(self.summary_base_height) + self.summary_padding
    }
}

pub fn grid_rows(printing_count: usize, columns: usize) -> usize {
    if columns == 0 {
        return 0;
    }
    printing_count.div_ceil(columns)
}

pub fn plan_card(
    card_name: &str,
    printing_count: usize,
    metrics: &LayoutMetrics,
) -> LayoutBlock {
    let columns = metrics.grid_columns();
    let rows = grid_rows(printing_count, columns);
    let (grid_top_margin, grid_height) = if rows > 0 {
        let pitch = metrics.grid_cell_height + metrics.grid_spacing_y;
        (
            metrics.grid_top_margin,
            rows as f32 * pitch - metrics.grid_spacing_y,
        )
    } else {
        (0.0, 0.0)
    };

    let header_height = metrics.header_height();
    LayoutBlock {
        card_name: card_name.to_string(),
        header_height,
        main_image_height: metrics.main_image_height,
        body_height: metrics.main_image_height,
        printing_count,
        printing_grid_columns: columns,
        printing_grid_rows: rows,
        grid_top_margin,
        printing_grid_height: grid_height,
        total_height: header_height
            + metrics.main_image_height
            + grid_top_margin
            + grid_height
            + metrics.margin_bottom,
    }
}

/// Copy of `block` tall enough for a text column ending `text_column_bottom`
/// points below the block top. The grid moves down with the body; a column
/// that fits beside the main image leaves the block unchanged.
pub fn fit_text_column(block: &LayoutBlock, text_column_bottom: f32) -> LayoutBlock {
    let body_height = (text_column_bottom - block.header_height).max(block.body_height);
    LayoutBlock {
        body_height,
        total_height: block.total_height + (body_height - block.body_height),
        ..block.clone()
    }
}

/// Builds the read-only plan for one render job.
///
/// `advice_height` is the measured height of the advice text; it is only
/// read when the mode includes the summary.
pub fn plan(
    cards: &[KeptCard],
    mode: GenerationMode,
    printings: PrintingPolicy,
    advice_height: f32,
    metrics: &LayoutMetrics,
) -> DocumentPlan {
    let summary = mode.includes_summary().then(|| SummaryBlock {
        advice_height,
        total_height: metrics.summary_height(advice_height),
    });

    let blocks: Vec<LayoutBlock> = if mode.includes_cards() {
        cards
            .iter()
            .map(|card| {
                let count = match printings {
                    PrintingPolicy::Include => card.printings.len(),
                    PrintingPolicy::Exclude => 0,
                };
                plan_card(&card.record.name, count, metrics)
            })
            .collect()
    } else {
        Vec::new()
    };

    let summary_height = summary.as_ref().map(|s| s.total_height).unwrap_or(0.0);
    let cards_height: f32 = blocks.iter().map(|b| b.total_height).sum();
    let slack = if mode.includes_cards() {
        metrics.cards_slack
    } else {
        metrics.summary_slack
    };

    DocumentPlan {
        mode,
        page_width: metrics.page_width,
        summary,
        blocks,
        total_height: summary_height + cards_height + slack,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fake_catalog::{card, printings};

    fn kept(name: &str, printing_count: usize) -> KeptCard {
        KeptCard {
            record: card(name, "Instant", 1.0, None, &[]),
            count: 1,
            printings: printings(printing_count),
        }
    }

    #[test]
    fn test_letter_page_fits_five_columns() {
        let metrics = LayoutMetrics::default();
        assert_eq!(metrics.header_height(), 46.0);
        assert_eq!(metrics.grid_columns(), 5);
        assert_eq!(metrics.text_column_x(), 270.0);
        assert_eq!(metrics.text_column_width(), 292.0);
    }

    #[test]
    fn test_seven_printings_in_four_columns_take_two_rows() {
        assert_eq!(grid_rows(7, 4), 2);
        assert_eq!(grid_rows(8, 4), 2);
        assert_eq!(grid_rows(9, 4), 3);
        assert_eq!(grid_rows(0, 4), 0);
    }

    #[test]
    fn test_narrow_page_still_has_one_column() {
        let metrics = LayoutMetrics {
            page_width: 150.0,
            ..LayoutMetrics::default()
        };
        assert_eq!(metrics.grid_columns(), 1);
    }

    #[test]
    fn test_card_height_formula() {
        let metrics = LayoutMetrics::default();

        let bare = plan_card("Anger", 0, &metrics);
        assert_eq!(bare.grid_top_margin, 0.0);
        assert_eq!(bare.printing_grid_height, 0.0);
        assert_eq!(bare.total_height, 46.0 + 280.0 + 100.0);

        // 7 printings over 5 columns: two rows of 110 with one 35 gap
        let gridded = plan_card("Anger", 7, &metrics);
        assert_eq!(gridded.printing_grid_rows, 2);
        assert_eq!(gridded.printing_grid_height, 255.0);
        assert_eq!(gridded.total_height, 46.0 + 280.0 + 20.0 + 255.0 + 100.0);
    }

    #[test]
    fn test_tall_text_column_grows_the_block() {
        let metrics = LayoutMetrics::default();
        let block = plan_card("Anger", 7, &metrics);

        let short = fit_text_column(&block, 46.0 + 200.0);
        assert_eq!(short, block);

        let tall = fit_text_column(&block, 46.0 + 400.0);
        assert_eq!(tall.body_height, 400.0);
        assert_eq!(tall.total_height, block.total_height + 120.0);
        assert_eq!(tall.printing_grid_height, block.printing_grid_height);
    }

    #[test]
    fn test_cards_mode_has_no_summary() {
        let metrics = LayoutMetrics::default();
        let cards = vec![kept("A", 0), kept("B", 3)];

        let plan = plan(&cards, GenerationMode::Cards, PrintingPolicy::Include, 0.0, &metrics);

        assert!(plan.summary.is_none());
        assert_eq!(plan.page_count(), 2);
        let names: Vec<&str> = plan.blocks.iter().map(|b| b.card_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        let cards_height: f32 = plan.blocks.iter().map(|b| b.total_height).sum();
        assert_eq!(plan.total_height, cards_height + 800.0);
    }

    #[test]
    fn test_suggestions_mode_has_only_summary() {
        let metrics = LayoutMetrics::default();
        let plan = plan(
            &[kept("A", 2)],
            GenerationMode::Suggestions,
            PrintingPolicy::Include,
            20.0,
            &metrics,
        );

        assert!(plan.blocks.is_empty());
        let summary = plan.summary.as_ref().unwrap();
        assert_eq!(summary.total_height, 180.0 + 200.0);
        assert_eq!(plan.total_height, 380.0 + 200.0);
    }

    #[test]
    fn test_long_advice_grows_summary() {
        let metrics = LayoutMetrics::default();
        assert_eq!(metrics.summary_height(0.0), 380.0);
        assert_eq!(metrics.summary_height(140.0), 160.0 + 140.0 + 200.0);
    }

    #[test]
    fn test_excluded_printings_give_empty_grids() {
        let metrics = LayoutMetrics::default();
        let plan = plan(
            &[kept("A", 9)],
            GenerationMode::Both,
            PrintingPolicy::Exclude,
            0.0,
            &metrics,
        );

        assert_eq!(plan.blocks[0].printing_grid_rows, 0);
        assert_eq!(plan.page_count(), 2);
        assert_eq!(
            plan.total_height,
            380.0 + plan.blocks[0].total_height + 800.0
        );
    }
}
