// src/domain/layout.rs
//
// Read-only document plan produced before the first draw call.
//
// CRITICAL RULES:
// - A plan is computed once and consumed once by the renderer
// - Blocks are in input card order; the summary, when present, comes first
// - Heights are in PDF points

use serde::{Deserialize, Serialize};

use crate::domain::deck::GenerationMode;

/// How blocks are mapped onto output pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageLayout {
    /// One page per block, each as tall as its block.
    #[default]
    Paged,
    /// A single page as tall as the whole plan.
    Continuous,
}

/// Geometry of one card section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    pub card_name: String,
    pub header_height: f32,
    pub main_image_height: f32,
    /// Space between header and grid: the main image or the text column
    /// beside it, whichever is taller.
    pub body_height: f32,
    pub printing_count: usize,
    pub printing_grid_columns: usize,
    pub printing_grid_rows: usize,
    /// Gap between the main image and the grid; zero when the grid is empty.
    pub grid_top_margin: f32,
    pub printing_grid_height: f32,
    pub total_height: f32,
}

/// Geometry of the summary section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryBlock {
    /// Measured height of the wrapped advice text.
    pub advice_height: f32,
    pub total_height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPlan {
    pub mode: GenerationMode,
    pub page_width: f32,
    pub summary: Option<SummaryBlock>,
    pub blocks: Vec<LayoutBlock>,
    /// Extent of the whole document, slack included.
    pub total_height: f32,
}

impl DocumentPlan {
    /// Number of pages a paged rendering of this plan produces.
    pub fn page_count(&self) -> usize {
        self.blocks.len() + usize::from(self.summary.is_some())
    }
}
