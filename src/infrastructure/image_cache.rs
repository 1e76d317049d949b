// src/infrastructure/image_cache.rs
//
// On-disk cache for downloaded card images.
//
// CRITICAL RULES:
// - The file name is a pure function of (key, size): <escaped key>_<size>.jpg
// - A present file is trusted as-is; no revalidation
// - Keys are escaped so that any card name maps to a single safe file name

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::AppResult;

#[derive(Debug, Clone)]
pub struct ImageCache {
    dir: PathBuf,
}

impl ImageCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> AppResult<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn path_for(&self, key: &str, size: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.jpg", escape_key(key), size))
    }

    /// Cached file for the key, if it was stored before.
    pub fn lookup(&self, key: &str, size: &str) -> Option<PathBuf> {
        let path = self.path_for(key, size);
        if path.is_file() {
            debug!("Image cache hit: {}", path.display());
            Some(path)
        } else {
            None
        }
    }

    pub fn store(&self, key: &str, size: &str, bytes: &[u8]) -> AppResult<PathBuf> {
        self.ensure_dir()?;
        let path = self.path_for(key, size);
        fs::write(&path, bytes)?;
        debug!("Image cached: {}", path.display());
        Ok(path)
    }
}

/// Percent-escapes everything except ASCII alphanumerics and `-_.~`.
pub fn escape_key(key: &str) -> String {
    let mut escaped = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                escaped.push(byte as char)
            }
            other => escaped.push_str(&format!("%{:02X}", other)),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_key() {
        assert_eq!(escape_key("Anger"), "Anger");
        assert_eq!(
            escape_key("Sauron, the Dark Lord"),
            "Sauron%2C%20the%20Dark%20Lord"
        );
        assert_eq!(escape_key("Fire // Ice"), "Fire%20%2F%2F%20Ice");
    }

    #[test]
    fn test_path_is_deterministic() {
        let cache = ImageCache::new("/cache");
        assert_eq!(
            cache.path_for("Arcane Denial", "normal"),
            PathBuf::from("/cache/Arcane%20Denial_normal.jpg")
        );
        assert_eq!(
            cache.path_for("Arcane Denial", "normal"),
            cache.path_for("Arcane Denial", "normal")
        );
    }

    #[test]
    fn test_store_then_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ImageCache::new(dir.path().join("images"));

        assert!(cache.lookup("Anger", "normal").is_none());

        let stored = cache.store("Anger", "normal", b"jpeg-bytes").unwrap();
        assert_eq!(cache.lookup("Anger", "normal"), Some(stored.clone()));
        assert_eq!(fs::read(stored).unwrap(), b"jpeg-bytes");
        assert!(cache.lookup("Anger", "small").is_none());
    }
}
