// src/render/mod.rs
//
// Drawing layer: the surface abstraction, its PDF implementation and the
// text measurement shared by the planner and the renderer.

pub mod markup;
pub mod pdf_surface;
pub mod surface;
pub mod text_metrics;

pub use pdf_surface::PdfSurface;
pub use surface::{DrawingSurface, FontStyle, Rect};
