// src/services/deck_aggregator.rs
//
// Deck Aggregator - fetches every distinct card once and derives the
// deck-wide statistics.
//
// CRITICAL RULES:
// - Cards are visited in input order, one request chain at a time
// - A missing card is skipped and reported, never fatal
// - Land policy is applied before the card contributes to anything
// - Printing policy only decides whether the printing list is fetched
// - Cancellation is polled before each card

use std::sync::Arc;

use log::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{
    AggregateStats, CardRecord, DeckList, LandPolicy, PrintingPolicy, PrintingRecord,
    StatsAccumulator,
};
use crate::error::AppResult;
use crate::events::{CardExcluded, CardSkipped, EventBus};
use crate::integrations::CardCatalog;
use crate::services::cancellation::CancellationToken;

/// Language of every card lookup. Mechanics are matched on English rules text.
pub const CARD_LANGUAGE: &str = "en";

/// A found card that survived the land policy.
#[derive(Debug, Clone, PartialEq)]
pub struct KeptCard {
    pub record: CardRecord,
    pub count: u32,
    pub printings: Vec<PrintingRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Kept cards in input order.
    pub cards: Vec<KeptCard>,
    pub stats: AggregateStats,
    /// Names with no data.
    pub skipped: Vec<String>,
    /// Names removed by the land policy.
    pub excluded: Vec<String>,
}

pub struct DeckAggregator {
    catalog: Arc<dyn CardCatalog>,
    event_bus: Arc<EventBus>,
}

impl DeckAggregator {
    pub fn new(catalog: Arc<dyn CardCatalog>, event_bus: Arc<EventBus>) -> Self {
        Self { catalog, event_bus }
    }

    pub async fn aggregate(
        &self,
        job_id: Uuid,
        deck: &DeckList,
        lands: LandPolicy,
        printings: PrintingPolicy,
        cancel: &CancellationToken,
    ) -> AppResult<Aggregation> {
        let usd_to_eur = self.catalog.usd_to_eur();
        let mut accumulator = StatsAccumulator::new();
        let mut aggregation = Aggregation::default();

        for entry in deck.entries() {
            cancel.check()?;

            let Some(record) = self.catalog.fetch_card(&entry.name, CARD_LANGUAGE).await else {
                warn!("Skipping '{}': no card data", entry.name);
                aggregation.skipped.push(entry.name.clone());
                self.event_bus
                    .emit(CardSkipped::new(job_id, entry.name.clone()));
                continue;
            };

            if lands.excludes(&record) {
                info!("Excluding '{}' ({:?} land policy)", record.name, lands);
                aggregation.excluded.push(entry.name.clone());
                self.event_bus
                    .emit(CardExcluded::new(job_id, entry.name.clone(), lands));
                continue;
            }

            let unit_price = record.prices.eur_or_converted(usd_to_eur);
            if unit_price.is_none() {
                debug!("'{}' has no price; it adds nothing to the total", record.name);
            }
            accumulator.add(entry.count, unit_price, record.cmc, &record.colors);

            let printings = match printings {
                PrintingPolicy::Include => self.catalog.all_printings(&record).await,
                PrintingPolicy::Exclude => Vec::new(),
            };

            aggregation.cards.push(KeptCard {
                record,
                count: entry.count,
                printings,
            });
        }

        aggregation.stats = accumulator.finish();
        info!(
            "Aggregated {} card(s): {} kept, {} skipped, {} excluded",
            deck.len(),
            aggregation.cards.len(),
            aggregation.skipped.len(),
            aggregation.excluded.len()
        );
        Ok(aggregation)
    }
}
