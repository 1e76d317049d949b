// src/infrastructure/document_store.rs
//
// Directory of generated deck documents ("saved lists").
//
// CRITICAL RULES:
// - One document per list name: <sanitized name>.pdf
// - Regenerating a list overwrites its document
// - The directory must be writable BEFORE any network work starts

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// A document found in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredDocument {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the directory and proves it is writable.
    pub fn ensure_ready(&self) -> AppResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            AppError::Config(format!(
                "Output directory {} is not usable: {}",
                self.dir.display(),
                e
            ))
        })?;

        let probe = self.dir.join(".manaprint-write-probe");
        fs::write(&probe, b"").map_err(|e| {
            AppError::Config(format!(
                "Output directory {} is not writable: {}",
                self.dir.display(),
                e
            ))
        })?;
        let _ = fs::remove_file(&probe);
        Ok(())
    }

    pub fn path_for(&self, list_name: &str) -> PathBuf {
        self.dir.join(format!("{}.pdf", sanitize_file_stem(list_name)))
    }

    /// Saved documents sorted by name. A missing directory is an empty store.
    pub fn list(&self) -> AppResult<Vec<StoredDocument>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut documents = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_pdf = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false);
            if !is_pdf {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                documents.push(StoredDocument {
                    name: stem.to_string(),
                    path: path.clone(),
                });
            }
        }
        documents.sort_by(|a, b| a.name.cmp(&b.name));
        info!("{} saved document(s) in {}", documents.len(), self.dir.display());
        Ok(documents)
    }
}

/// Replaces path separators and control characters; trims surrounding blanks.
pub fn sanitize_file_stem(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("  My Deck "), "My Deck");
        assert_eq!(sanitize_file_stem("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_file_stem(".."), "untitled");
    }

    #[test]
    fn test_path_for_appends_pdf() {
        let store = DocumentStore::new("/docs");
        assert_eq!(store.path_for("Sauron"), PathBuf::from("/docs/Sauron.pdf"));
    }

    #[test]
    fn test_list_is_sorted_and_filters_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        store.ensure_ready().unwrap();

        fs::write(dir.path().join("zeta.pdf"), b"%PDF").unwrap();
        fs::write(dir.path().join("alpha.pdf"), b"%PDF").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let names: Vec<String> = store.list().unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[test]
    fn test_missing_directory_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("absent"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_unusable_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();

        let store = DocumentStore::new(blocker.join("lists"));
        let err = store.ensure_ready().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.is_fatal());
    }
}
