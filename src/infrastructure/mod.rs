// src/infrastructure/mod.rs
//
// Infrastructure Layer
//
// Local storage that supports the pipeline but holds no domain rules.
//
// RULES:
// - Infrastructure serves the services
// - Infrastructure never dictates domain behavior
// - Infrastructure is replaceable

pub mod document_store;
pub mod image_cache;

pub use document_store::{DocumentStore, StoredDocument};
pub use image_cache::ImageCache;
