// src/domain/mechanics.rs
//
// Mechanics vocabulary: mechanic name -> standard explanatory description.
//
// A mechanic matches rules text on whole words, case-insensitively.
// The vocabulary is loaded once per process and read-only afterwards.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;

use crate::error::{AppError, AppResult};

const BUNDLED_VOCABULARY: &str = include_str!("../../data/mechanics.json");

#[derive(Debug, Clone)]
pub struct Mechanic {
    pub name: String,
    pub description: String,
    pattern: Regex,
}

impl Mechanic {
    fn new(name: String, description: String) -> AppResult<Self> {
        let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(&name)))
            .map_err(|e| AppError::Config(format!("Invalid mechanic name '{}': {}", name, e)))?;
        Ok(Self {
            name,
            description,
            pattern,
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MechanicsVocabulary {
    mechanics: Vec<Mechanic>,
}

impl MechanicsVocabulary {
    /// Parses a JSON object of `"mechanic": "description"` pairs.
    pub fn from_json(json: &str) -> AppResult<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)
            .map_err(|e| AppError::Config(format!("Cannot parse mechanics vocabulary: {}", e)))?;
        let mechanics = raw
            .into_iter()
            .map(|(name, description)| Mechanic::new(name, description))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Self { mechanics })
    }

    /// Loads a vocabulary file. Missing or malformed files are fatal.
    pub fn load(path: &Path) -> AppResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!(
                "Cannot read mechanics vocabulary {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }

    /// The vocabulary shipped with the binary.
    pub fn bundled() -> AppResult<Self> {
        Self::from_json(BUNDLED_VOCABULARY)
    }

    /// Loads `path` when given, the bundled vocabulary otherwise.
    pub fn load_or_bundled(path: Option<&Path>) -> AppResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::bundled(),
        }
    }

    /// Mechanics mentioned in `text`, in vocabulary order.
    pub fn scan(&self, text: &str) -> Vec<&Mechanic> {
        self.mechanics.iter().filter(|m| m.matches(text)).collect()
    }

    pub fn describe(&self, name: &str) -> Option<&str> {
        self.mechanics
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.description.as_str())
    }

    pub fn len(&self) -> usize {
        self.mechanics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mechanics.is_empty()
    }
}
