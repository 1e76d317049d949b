// src/services/mechanics_service.rs
//
// "Explain the mechanics": for every distinct card of a list, the English
// rules text and each vocabulary mechanic it mentions.

use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::domain::MechanicsVocabulary;
use crate::integrations::CardCatalog;
use crate::services::deck_aggregator::CARD_LANGUAGE;
use crate::services::list_parser::parse_list;

pub const DATA_NOT_FOUND: &str = "Data not found.";
pub const NO_RULES_TEXT: &str = "No description available";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MechanicExplanation {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MechanicsReport {
    pub card: String,
    pub found: bool,
    pub oracle_text: String,
    pub mechanics: Vec<MechanicExplanation>,
}

pub struct MechanicsService {
    catalog: Arc<dyn CardCatalog>,
    vocabulary: Arc<MechanicsVocabulary>,
}

impl MechanicsService {
    pub fn new(catalog: Arc<dyn CardCatalog>, vocabulary: Arc<MechanicsVocabulary>) -> Self {
        Self {
            catalog,
            vocabulary,
        }
    }

    /// One report per distinct card name, in input order.
    pub async fn explain(&self, text: &str) -> Vec<MechanicsReport> {
        let deck = parse_list(text);
        let mut reports = Vec::with_capacity(deck.len());

        for name in deck.names() {
            let Some(card) = self.catalog.fetch_card(name, CARD_LANGUAGE).await else {
                reports.push(MechanicsReport {
                    card: name.to_string(),
                    found: false,
                    oracle_text: DATA_NOT_FOUND.to_string(),
                    mechanics: Vec::new(),
                });
                continue;
            };

            let mechanics = self
                .vocabulary
                .scan(&card.oracle_text)
                .into_iter()
                .map(|m| MechanicExplanation {
                    name: m.name.clone(),
                    description: m.description.clone(),
                })
                .collect();

            let oracle_text = if card.oracle_text.trim().is_empty() {
                NO_RULES_TEXT.to_string()
            } else {
                card.oracle_text
            };

            reports.push(MechanicsReport {
                card: name.to_string(),
                found: true,
                oracle_text,
                mechanics,
            });
        }

        info!("Explained mechanics for {} card(s)", reports.len());
        reports
    }
}
