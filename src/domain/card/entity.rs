use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Market prices of a card or printing, as published by the card-data service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prices {
    pub usd: Option<f64>,
    pub eur: Option<f64>,
    pub usd_foil: Option<f64>,
    pub eur_foil: Option<f64>,
}

impl Prices {
    /// Normal price in EUR, converting from USD when the EUR field is absent.
    pub fn eur_or_converted(&self, usd_to_eur: f64) -> Option<f64> {
        self.eur.or_else(|| self.usd.map(|usd| round_cents(usd * usd_to_eur)))
    }

    /// Foil price in EUR, converting from USD foil when the EUR field is absent.
    pub fn eur_foil_or_converted(&self, usd_to_eur: f64) -> Option<f64> {
        self.eur_foil
            .or_else(|| self.usd_foil.map(|usd| round_cents(usd * usd_to_eur)))
    }

    /// Normal and foil prices resolved independently.
    pub fn summary(&self, usd_to_eur: f64) -> PriceSummary {
        PriceSummary {
            normal: self.eur_or_converted(usd_to_eur),
            foil: self.eur_foil_or_converted(usd_to_eur),
        }
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Human-facing price report for a card page.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceSummary {
    pub normal: Option<f64>,
    pub foil: Option<f64>,
}

impl PriceSummary {
    pub fn is_available(&self) -> bool {
        self.normal.is_some() || self.foil.is_some()
    }

    /// Lines printed under the "Price:" heading.
    pub fn lines(&self) -> Vec<String> {
        if !self.is_available() {
            return vec!["Price not available".to_string()];
        }
        let normal = match self.normal {
            Some(price) => format!("Normal price: {:.2}€", price),
            None => "Normal price not available".to_string(),
        };
        let foil = match self.foil {
            Some(price) => format!("Foil price: {:.2}€", price),
            None => "Foil price not available".to_string(),
        };
        vec![normal, foil]
    }
}

impl fmt::Display for PriceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

/// A card looked up by exact name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub name: String,
    /// English rules text.
    pub oracle_text: String,
    pub mana_cost: String,
    pub cmc: f64,
    pub colors: BTreeSet<String>,
    pub type_line: String,
    pub prices: Prices,
    pub artist: String,
    pub image_uri: Option<String>,
    /// Stable identifier shared by every printing of the card.
    pub oracle_id: String,
    pub printings_uri: Option<String>,
}

impl CardRecord {
    pub fn is_land(&self) -> bool {
        self.type_line.contains("Land")
    }
}

/// One published edition of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintingRecord {
    pub id: String,
    pub set_name: String,
    /// Four-digit year, empty when the release date is unknown.
    pub released_year: String,
    pub prices: Prices,
    pub small_image_uri: Option<String>,
}

impl PrintingRecord {
    /// Grid caption: set name, release year and best available price.
    pub fn caption(&self, usd_to_eur: f64) -> String {
        let mut caption = if self.released_year.is_empty() {
            self.set_name.clone()
        } else {
            format!("{} - {}", self.set_name, self.released_year)
        };
        if let Some(price) = self.prices.eur_or_converted(usd_to_eur) {
            caption.push_str(&format!(" - {:.2}€", price));
        }
        caption
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_price_preferred_over_conversion() {
        let prices = Prices {
            usd: Some(10.0),
            eur: Some(7.5),
            ..Default::default()
        };
        assert_eq!(prices.eur_or_converted(0.9), Some(7.5));
    }

    #[test]
    fn test_secondary_currency_converted() {
        let prices = Prices {
            usd: Some(10.0),
            usd_foil: Some(3.333),
            ..Default::default()
        };
        let summary = prices.summary(0.9);
        assert_eq!(summary.normal, Some(9.0));
        assert_eq!(summary.foil, Some(3.0));
    }

    #[test]
    fn test_price_lines_fall_back_independently() {
        let summary = PriceSummary {
            normal: Some(2.0),
            foil: None,
        };
        assert_eq!(
            summary.lines(),
            vec!["Normal price: 2.00€", "Foil price not available"]
        );
        assert_eq!(PriceSummary::default().lines(), vec!["Price not available"]);
    }

    #[test]
    fn test_printing_caption() {
        let printing = PrintingRecord {
            id: "abc".to_string(),
            set_name: "Alpha".to_string(),
            released_year: "1993".to_string(),
            prices: Prices {
                usd: Some(100.0),
                ..Default::default()
            },
            small_image_uri: None,
        };
        assert_eq!(printing.caption(0.5), "Alpha - 1993 - 50.00€");

        let undated = PrintingRecord {
            released_year: String::new(),
            prices: Prices::default(),
            ..printing
        };
        assert_eq!(undated.caption(0.5), "Alpha");
    }
}
