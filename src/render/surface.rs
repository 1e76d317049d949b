// src/render/surface.rs
//
// Drawing surface abstraction.
//
// Coordinates are in points with the origin at the TOP-LEFT corner of the
// current page and y growing downwards; text is positioned by its baseline.
// Implementations translate to their native coordinate system.

use std::path::Path;

use crate::error::AppResult;
use crate::render::text_metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Largest rectangle of the given aspect ratio centred inside `self`.
    pub fn fit(&self, source_width: f32, source_height: f32) -> Rect {
        if source_width <= 0.0 || source_height <= 0.0 {
            return *self;
        }
        let scale = (self.width / source_width).min(self.height / source_height);
        let width = source_width * scale;
        let height = source_height * scale;
        Rect {
            x: self.x + (self.width - width) / 2.0,
            y: self.y + (self.height - height) / 2.0,
            width,
            height,
        }
    }
}

pub trait DrawingSurface {
    /// Starts a new page; every later call draws on it.
    fn begin_page(&mut self, width: f32, height: f32) -> AppResult<()>;

    fn draw_text(&mut self, x: f32, y: f32, size: f32, style: FontStyle, text: &str) -> AppResult<()>;

    /// Draws the image scaled into `frame`, preserving its aspect ratio.
    fn draw_image(&mut self, path: &Path, frame: Rect) -> AppResult<()>;

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32) -> AppResult<()>;

    /// Attaches a tooltip-style note to a region of the current page.
    fn annotate(&mut self, frame: Rect, title: &str, contents: &str) -> AppResult<()>;

    fn page_count(&self) -> usize;

    fn text_width(&self, text: &str, size: f32, style: FontStyle) -> f32 {
        text_metrics::text_width(text, size, style)
    }
}
