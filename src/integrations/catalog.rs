// src/integrations/catalog.rs
//
// Card catalog port.
//
// Services depend on this trait, never on the concrete gateway.
//
// CRITICAL RULES:
// - No method raises: absence is Option/empty/sentinel
// - The exchange rate is fixed for the lifetime of a catalog

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::{CardRecord, PriceSummary, PrintingRecord};

/// Returned by `localized_text` when any lookup step fails.
pub const LOCALIZED_TEXT_UNAVAILABLE: &str = "Localized text not available";

/// Image size suffixes used as part of the cache key.
pub const IMAGE_NORMAL: &str = "normal";
pub const IMAGE_SMALL: &str = "small";

#[async_trait]
pub trait CardCatalog: Send + Sync {
    /// Exact-name lookup. Not found and transport failures are both `None`.
    async fn fetch_card(&self, name: &str, language: &str) -> Option<CardRecord>;

    /// Rules text of a printing in the configured language sharing the card's oracle id.
    async fn localized_text(&self, card: &CardRecord) -> String;

    /// Every printing of the card; empty when there is no link or the fetch fails.
    async fn all_printings(&self, card: &CardRecord) -> Vec<PrintingRecord>;

    /// Local path of the image, downloading it into the cache when needed.
    async fn fetch_image(&self, uri: &str, cache_key: &str, size: &str) -> Option<PathBuf>;

    /// USD to EUR ratio used for every conversion in this session.
    fn usd_to_eur(&self) -> f64;

    fn price_summary(&self, card: &CardRecord) -> PriceSummary {
        card.prices.summary(self.usd_to_eur())
    }
}
