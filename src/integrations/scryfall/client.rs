// src/integrations/scryfall/client.rs
//
// Scryfall card-data gateway.
//
// ARCHITECTURE:
// - Typed accessors over the shared RateLimitedClient
// - Maps Scryfall JSON → CardRecord / PrintingRecord (wire structs stay private)
// - Used through the CardCatalog trait by the services
//
// CRITICAL RULES:
// - Nothing raises past this boundary: failures are logged and become
//   None / empty list / sentinel text
// - Prices arrive as decimal strings and are parsed here
// - The exchange rate is captured at construction and never refreshed

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;

use crate::domain::{CardRecord, PriceSummary, Prices, PrintingRecord};
use crate::error::{AppError, AppResult};
use crate::infrastructure::ImageCache;
use crate::integrations::catalog::{CardCatalog, IMAGE_NORMAL, IMAGE_SMALL, LOCALIZED_TEXT_UNAVAILABLE};
use crate::integrations::http::RateLimitedClient;

// ============================================================================
// WIRE FORMAT
// ============================================================================

#[derive(Debug, Deserialize)]
struct CardData {
    #[serde(default)]
    id: Option<String>,
    name: String,
    oracle_id: Option<String>,
    oracle_text: Option<String>,
    printed_text: Option<String>,
    mana_cost: Option<String>,
    cmc: Option<f64>,
    colors: Option<Vec<String>>,
    type_line: Option<String>,
    #[serde(default)]
    prices: PriceData,
    artist: Option<String>,
    image_uris: Option<ImageUris>,
    prints_search_uri: Option<String>,
    set_name: Option<String>,
    released_at: Option<String>,
    #[serde(default)]
    card_faces: Vec<FaceData>,
}

#[derive(Debug, Default, Deserialize)]
struct PriceData {
    usd: Option<String>,
    usd_foil: Option<String>,
    eur: Option<String>,
    eur_foil: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageUris {
    small: Option<String>,
    normal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FaceData {
    oracle_text: Option<String>,
    printed_text: Option<String>,
    mana_cost: Option<String>,
    colors: Option<Vec<String>>,
    image_uris: Option<ImageUris>,
}

#[derive(Debug, Deserialize)]
struct CardList {
    #[serde(default)]
    data: Vec<CardData>,
    #[serde(default)]
    has_more: bool,
    next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExchangeRateData {
    rates: ExchangeRates,
}

#[derive(Debug, Deserialize)]
struct ExchangeRates {
    #[serde(rename = "EUR")]
    eur: f64,
}

// ============================================================================
// MAPPING
// ============================================================================

fn parse_price(raw: &Option<String>) -> Option<f64> {
    raw.as_deref()
        .and_then(|value| value.trim().parse::<f64>().ok())
}

impl From<&PriceData> for Prices {
    fn from(data: &PriceData) -> Self {
        Prices {
            usd: parse_price(&data.usd),
            eur: parse_price(&data.eur),
            usd_foil: parse_price(&data.usd_foil),
            eur_foil: parse_price(&data.eur_foil),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

impl CardData {
    /// Top-level text, else the faces' texts joined by a blank line.
    fn rules_text(&self, pick: fn(&FaceData) -> &Option<String>, top: &Option<String>) -> Option<String> {
        if let Some(text) = non_empty(top) {
            return Some(text.to_string());
        }
        let faces: Vec<&str> = self
            .card_faces
            .iter()
            .filter_map(|face| non_empty(pick(face)))
            .collect();
        if faces.is_empty() {
            None
        } else {
            Some(faces.join("\n\n"))
        }
    }

    fn image(&self, size: &str) -> Option<String> {
        let pick = |uris: &ImageUris| -> Option<String> {
            match size {
                IMAGE_SMALL => uris.small.clone().or_else(|| uris.normal.clone()),
                _ => uris.normal.clone(),
            }
        };
        self.image_uris.as_ref().and_then(pick).or_else(|| {
            self.card_faces
                .iter()
                .find_map(|face| face.image_uris.as_ref().and_then(pick))
        })
    }

    fn into_card_record(self) -> CardRecord {
        let oracle_text = self
            .rules_text(|face| &face.oracle_text, &self.oracle_text)
            .unwrap_or_default();

        let mana_cost = match non_empty(&self.mana_cost) {
            Some(cost) => cost.to_string(),
            None => self
                .card_faces
                .iter()
                .filter_map(|face| non_empty(&face.mana_cost))
                .collect::<Vec<_>>()
                .join(" // "),
        };

        let mut colors: BTreeSet<String> = self.colors.clone().unwrap_or_default().into_iter().collect();
        if self.colors.is_none() {
            for face in &self.card_faces {
                colors.extend(face.colors.clone().unwrap_or_default());
            }
        }

        CardRecord {
            image_uri: self.image(IMAGE_NORMAL),
            prices: Prices::from(&self.prices),
            name: self.name,
            oracle_text,
            mana_cost,
            cmc: self.cmc.unwrap_or(0.0),
            colors,
            type_line: self.type_line.unwrap_or_default(),
            artist: self.artist.unwrap_or_default(),
            oracle_id: self.oracle_id.unwrap_or_default(),
            printings_uri: self.prints_search_uri,
        }
    }

    fn into_printing_record(self) -> PrintingRecord {
        let released_year = self
            .released_at
            .as_deref()
            .and_then(|date| date.get(..4))
            .map(str::to_string)
            .unwrap_or_default();

        PrintingRecord {
            small_image_uri: self.image(IMAGE_SMALL),
            prices: Prices::from(&self.prices),
            id: self.id.unwrap_or_else(|| self.name.clone()),
            set_name: self.set_name.unwrap_or_else(|| "Unknown set".to_string()),
            released_year,
        }
    }

    fn localized_text(&self) -> Option<String> {
        self.rules_text(|face| &face.printed_text, &self.printed_text)
    }
}

// ============================================================================
// GATEWAY
// ============================================================================

/// Fetches the USD→EUR ratio once; any failure yields `default_rate`.
pub async fn fetch_usd_to_eur(client: &RateLimitedClient, url: &str, default_rate: f64) -> f64 {
    let result: AppResult<f64> = async {
        let response = client.get(url, &[]).await?;
        let data: ExchangeRateData = response.json(url)?;
        Ok(data.rates.eur)
    }
    .await;

    match result {
        Ok(rate) if rate.is_finite() && rate > 0.0 => {
            debug!("USD -> EUR rate: {}", rate);
            rate
        }
        Ok(rate) => {
            warn!("Ignoring implausible exchange rate {}; using {}", rate, default_rate);
            default_rate
        }
        Err(e) => {
            warn!("Exchange rate unavailable ({}); using {}", e, default_rate);
            default_rate
        }
    }
}

pub struct ScryfallGateway {
    client: Arc<RateLimitedClient>,
    base_url: String,
    language: String,
    images: ImageCache,
    usd_to_eur: f64,
}

impl ScryfallGateway {
    pub fn new(
        client: Arc<RateLimitedClient>,
        base_url: impl Into<String>,
        language: impl Into<String>,
        images: ImageCache,
        usd_to_eur: f64,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            language: language.into(),
            images,
            usd_to_eur,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> AppResult<T> {
        let response = self.client.get(url, params).await?;
        response.json(url)
    }

    async fn try_fetch_card(&self, name: &str, language: &str) -> AppResult<CardRecord> {
        let url = format!("{}/cards/named", self.base_url);
        let params = vec![
            ("exact".to_string(), name.to_string()),
            ("lang".to_string(), language.to_string()),
        ];
        let data: CardData = self.get_json(&url, &params).await.map_err(|e| match e {
            AppError::Upstream { status: 404, .. } => AppError::CardNotFound(name.to_string()),
            other => other,
        })?;
        Ok(data.into_card_record())
    }

    async fn try_localized_text(&self, oracle_id: &str) -> AppResult<Option<String>> {
        let url = format!("{}/cards/search", self.base_url);
        let params = vec![
            (
                "q".to_string(),
                format!("oracleid:{} lang:{}", oracle_id, self.language),
            ),
            ("unique".to_string(), "prints".to_string()),
        ];
        let list: CardList = self.get_json(&url, &params).await?;
        Ok(list.data.first().and_then(CardData::localized_text))
    }

    /// Name-based variant: looks up the English record first.
    pub async fn localized_text_by_name(&self, name: &str) -> String {
        match self.fetch_card(name, "en").await {
            Some(card) => self.localized_text(&card).await,
            None => LOCALIZED_TEXT_UNAVAILABLE.to_string(),
        }
    }

    /// Name-based price lookup; `None` when the card itself cannot be found.
    pub async fn price_by_name(&self, name: &str) -> Option<PriceSummary> {
        self.fetch_card(name, "en")
            .await
            .map(|card| self.price_summary(&card))
    }
}

#[async_trait]
impl CardCatalog for ScryfallGateway {
    async fn fetch_card(&self, name: &str, language: &str) -> Option<CardRecord> {
        match self.try_fetch_card(name, language).await {
            Ok(card) => Some(card),
            Err(e) => {
                warn!("No data for '{}' (lang={}): {}", name, language, e);
                None
            }
        }
    }

    async fn localized_text(&self, card: &CardRecord) -> String {
        if card.oracle_id.is_empty() {
            debug!("'{}' has no oracle id; no localized text", card.name);
            return LOCALIZED_TEXT_UNAVAILABLE.to_string();
        }
        match self.try_localized_text(&card.oracle_id).await {
            Ok(Some(text)) => text,
            Ok(None) => LOCALIZED_TEXT_UNAVAILABLE.to_string(),
            Err(e) => {
                warn!("Localized text lookup failed for '{}': {}", card.name, e);
                LOCALIZED_TEXT_UNAVAILABLE.to_string()
            }
        }
    }

    async fn all_printings(&self, card: &CardRecord) -> Vec<PrintingRecord> {
        let mut next = match &card.printings_uri {
            Some(uri) => Some(uri.clone()),
            None => return Vec::new(),
        };

        let mut printings = Vec::new();
        while let Some(url) = next.take() {
            match self.get_json::<CardList>(&url, &[]).await {
                Ok(page) => {
                    printings.extend(page.data.into_iter().map(CardData::into_printing_record));
                    if page.has_more {
                        next = page.next_page;
                    }
                }
                Err(e) => {
                    warn!("Printings fetch failed for '{}': {}", card.name, e);
                    break;
                }
            }
        }
        debug!("{} printing(s) for '{}'", printings.len(), card.name);
        printings
    }

    async fn fetch_image(&self, uri: &str, cache_key: &str, size: &str) -> Option<PathBuf> {
        if let Some(path) = self.images.lookup(cache_key, size) {
            return Some(path);
        }

        let result: AppResult<PathBuf> = async {
            let response = self.client.get(uri, &[]).await?;
            if !response.is_success() {
                return Err(AppError::Upstream {
                    status: response.status,
                    url: uri.to_string(),
                });
            }
            self.images.store(cache_key, size, &response.body)
        }
        .await;

        match result {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Image download failed for '{}': {}", cache_key, e);
                None
            }
        }
    }

    fn usd_to_eur(&self) -> f64 {
        self.usd_to_eur
    }
}
