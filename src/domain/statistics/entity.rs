use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Deck-wide totals shown on the summary page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_count: u64,
    pub total_price: f64,
    pub avg_price: f64,
    pub avg_cmc: f64,
    pub colors: BTreeSet<String>,
}

impl AggregateStats {
    /// Colors joined for display, "Colorless" when no kept card has a color.
    pub fn color_label(&self) -> String {
        if self.colors.is_empty() {
            "Colorless".to_string()
        } else {
            self.colors.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    }

    /// Lines of the statistics block on the summary page.
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Total number of cards: {}", self.total_count),
            format!("Total price: {:.2}€", self.total_price),
            format!("Average price per card: {:.2}€", self.avg_price),
            format!("Deck colors: {}", self.color_label()),
            format!("Average mana value (CMC): {:.2}", self.avg_cmc),
            "Assessment and advice:".to_string(),
        ]
    }
}

/// Running totals fed one kept card at a time.
#[derive(Debug, Clone, Default)]
pub struct StatsAccumulator {
    total_count: u64,
    total_price: f64,
    total_cmc: f64,
    colors: BTreeSet<String>,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, count: u32, unit_price: Option<f64>, cmc: f64, colors: &BTreeSet<String>) {
        self.total_count += u64::from(count);
        if let Some(price) = unit_price {
            self.total_price += price * count as f64;
        }
        self.total_cmc += cmc * count as f64;
        self.colors.extend(colors.iter().cloned());
    }

    pub fn finish(self) -> AggregateStats {
        let (avg_price, avg_cmc) = if self.total_count > 0 {
            let n = self.total_count as f64;
            (self.total_price / n, self.total_cmc / n)
        } else {
            (0.0, 0.0)
        };
        AggregateStats {
            total_count: self.total_count,
            total_price: self.total_price,
            avg_price,
            avg_cmc,
            colors: self.colors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_price_and_cmc_averages_weight_by_count() {
        let mut acc = StatsAccumulator::new();
        acc.add(3, Some(2.0), 2.0, &colors(&["B"]));
        acc.add(1, Some(5.0), 4.0, &colors(&["R"]));
        let stats = acc.finish();

        assert_eq!(stats.total_count, 4);
        assert!((stats.total_price - 11.0).abs() < 1e-9);
        assert!((stats.avg_price - 2.75).abs() < 1e-9);
        assert!((stats.avg_cmc - 2.5).abs() < 1e-9);
        assert_eq!(stats.color_label(), "B, R");
    }

    #[test]
    fn test_unpriced_card_still_counts() {
        let mut acc = StatsAccumulator::new();
        acc.add(2, None, 1.0, &BTreeSet::new());
        let stats = acc.finish();
        assert_eq!(stats.total_count, 2);
        assert_eq!(stats.total_price, 0.0);
        assert_eq!(stats.color_label(), "Colorless");
    }

    #[test]
    fn test_huge_counts_do_not_wrap() {
        let mut acc = StatsAccumulator::new();
        acc.add(4_000_000_000, Some(1.0), 1.0, &BTreeSet::new());
        acc.add(4_000_000_000, Some(1.0), 3.0, &BTreeSet::new());
        let stats = acc.finish();

        assert_eq!(stats.total_count, 8_000_000_000);
        assert!((stats.avg_cmc - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_deck_has_zero_averages() {
        let stats = StatsAccumulator::new().finish();
        assert_eq!(stats.avg_price, 0.0);
        assert_eq!(stats.avg_cmc, 0.0);
    }
}
