// src/application/commands/list_commands.rs

use crate::application::dto::DocumentDto;
use crate::application::error_handling::{ErrorResponse, ToErrorResponse};
use crate::infrastructure::DocumentStore;

/// Documents produced so far, sorted by name.
///
/// Takes the store directly: listing needs no network session.
pub fn list_documents(store: &DocumentStore) -> Result<Vec<DocumentDto>, ErrorResponse> {
    let documents = store.list().to_error_response()?;
    Ok(documents.into_iter().map(DocumentDto::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_pdfs_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Zombies.pdf"), b"%PDF").unwrap();
        std::fs::write(dir.path().join("Angels.pdf"), b"%PDF").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let documents = list_documents(&DocumentStore::new(dir.path())).unwrap();
        let names: Vec<&str> = documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Angels", "Zombies"]);
    }
}
