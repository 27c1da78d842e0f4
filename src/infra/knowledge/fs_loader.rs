// Loads the knowledge base from a directory of JSON documents.
//
// Each `*.json` file holds one document ({"title": ..., "content": ...}).
// Files are read in filename order so load order - and with it top-k tie
// ordering - is reproducible across platforms. A missing or empty
// directory falls back to the built-in document set; unparseable files are
// skipped with a warning.

use crate::core::knowledge::{default_documents, Document};
use std::path::Path;

pub fn load_documents(path: &Path) -> Vec<Document> {
    if !path.is_dir() {
        tracing::info!(
            "Knowledge directory {} not found, using built-in documents",
            path.display()
        );
        return default_documents();
    }

    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(
                "Failed to read knowledge directory {}: {}, using built-in documents",
                path.display(),
                e
            );
            return default_documents();
        }
    };

    let mut files: Vec<std::path::PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    let mut documents = Vec::new();
    for file in &files {
        match std::fs::read_to_string(file) {
            Ok(contents) => match serde_json::from_str::<Document>(&contents) {
                Ok(doc) => documents.push(doc),
                Err(e) => {
                    tracing::warn!("Skipping malformed document {}: {}", file.display(), e);
                }
            },
            Err(e) => {
                tracing::warn!("Skipping unreadable document {}: {}", file.display(), e);
            }
        }
    }

    if documents.is_empty() {
        tracing::info!(
            "No documents loaded from {}, using built-in documents",
            path.display()
        );
        return default_documents();
    }

    tracing::info!("Knowledge base loaded: {} documents", documents.len());
    documents
}
