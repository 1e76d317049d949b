// src/services/fake_catalog.rs
//
// In-memory CardCatalog for service tests. No network, no disk.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{CardRecord, Prices, PrintingRecord};
use crate::integrations::{CardCatalog, LOCALIZED_TEXT_UNAVAILABLE};

pub struct FakeCatalog {
    cards: HashMap<String, CardRecord>,
    printings: HashMap<String, Vec<PrintingRecord>>,
    localized: HashMap<String, String>,
    images: HashMap<String, PathBuf>,
    usd_to_eur: f64,
    pub printing_calls: AtomicUsize,
    pub lookups: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self {
            cards: HashMap::new(),
            printings: HashMap::new(),
            localized: HashMap::new(),
            images: HashMap::new(),
            usd_to_eur: 0.5,
            printing_calls: AtomicUsize::new(0),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn with_card(mut self, card: CardRecord) -> Self {
        self.cards.insert(card.name.clone(), card);
        self
    }

    pub fn with_printings(mut self, name: &str, printings: Vec<PrintingRecord>) -> Self {
        self.printings.insert(name.to_string(), printings);
        self
    }

    pub fn with_localized(mut self, name: &str, text: &str) -> Self {
        self.localized.insert(name.to_string(), text.to_string());
        self
    }

    pub fn with_image(mut self, uri: &str, path: PathBuf) -> Self {
        self.images.insert(uri.to_string(), path);
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl CardCatalog for FakeCatalog {
    async fn fetch_card(&self, name: &str, _language: &str) -> Option<CardRecord> {
        self.lookups.lock().unwrap().push(name.to_string());
        self.cards.get(name).cloned()
    }

    async fn localized_text(&self, card: &CardRecord) -> String {
        self.localized
            .get(&card.name)
            .cloned()
            .unwrap_or_else(|| LOCALIZED_TEXT_UNAVAILABLE.to_string())
    }

    async fn all_printings(&self, card: &CardRecord) -> Vec<PrintingRecord> {
        self.printing_calls.fetch_add(1, Ordering::SeqCst);
        self.printings.get(&card.name).cloned().unwrap_or_default()
    }

    async fn fetch_image(&self, uri: &str, _cache_key: &str, _size: &str) -> Option<PathBuf> {
        self.images.get(uri).cloned()
    }

    fn usd_to_eur(&self) -> f64 {
        self.usd_to_eur
    }
}

pub fn card(name: &str, type_line: &str, cmc: f64, eur: Option<f64>, colors: &[&str]) -> CardRecord {
    CardRecord {
        name: name.to_string(),
        oracle_text: String::new(),
        mana_cost: String::new(),
        cmc,
        colors: colors.iter().map(|c| c.to_string()).collect::<BTreeSet<_>>(),
        type_line: type_line.to_string(),
        prices: Prices {
            eur,
            ..Default::default()
        },
        artist: "Test Artist".to_string(),
        image_uri: None,
        oracle_id: format!("oracle-{}", name),
        printings_uri: Some(format!("https://example.test/prints/{}", name)),
    }
}

pub fn printing(id: &str, set_name: &str) -> PrintingRecord {
    PrintingRecord {
        id: id.to_string(),
        set_name: set_name.to_string(),
        released_year: "2020".to_string(),
        prices: Prices::default(),
        small_image_uri: None,
    }
}

pub fn printings(count: usize) -> Vec<PrintingRecord> {
    (0..count)
        .map(|i| printing(&format!("print-{}", i), &format!("Set {}", i)))
        .collect()
}
