// src/application/test_support.rs
//
// AppState wired around the in-memory catalog, with every directory in a
// scratch dir.

use std::sync::Arc;

use tempfile::TempDir;

use crate::application::state::AppState;
use crate::config::AppConfig;
use crate::domain::MechanicsVocabulary;
use crate::integrations::StaticAdvice;
use crate::services::fake_catalog::{card, printings, FakeCatalog};

pub fn test_state() -> (AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        image_cache_dir: dir.path().join("card_images"),
        documents_dir: dir.path().join("lists"),
        mana_symbols_dir: dir.path().join("mana_symbols"),
        ..AppConfig::default()
    };

    let mut angel = card("Serra Angel", "Creature — Angel", 5.0, Some(1.0), &["W"]);
    angel.oracle_text = "Flying, vigilance".to_string();
    let catalog = FakeCatalog::new()
        .with_card(angel)
        .with_printings("Serra Angel", printings(3));

    let state = AppState::with_components(
        config,
        Arc::new(catalog),
        Arc::new(StaticAdvice::fallback()),
        Arc::new(MechanicsVocabulary::bundled().unwrap()),
    );
    (state, dir)
}
