//! Source document stores.
//!
//! Documents are kept as extracted text with pages separated by form feed, the layout most
//! PDF-to-text extractors emit.

use crate::error::StorageError;
use crate::store::persistence::to_storage_io;
use crate::store::DocumentStore;
use sled::{Db, Tree};
use std::path::{Component, Path, PathBuf};

const TREE_DOCUMENTS: &str = "documents";
pub const PAGE_SEPARATOR: char = '\u{000C}';

/// Documents stored in a sled tree, keyed by document key.
#[derive(Clone)]
pub struct SledDocumentStore {
    documents: Tree,
}

impl SledDocumentStore {
    pub fn new(db: &Db) -> Result<Self, StorageError> {
        let documents = db.open_tree(TREE_DOCUMENTS).map_err(to_storage_io)?;
        Ok(Self { documents })
    }

    pub fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.documents
            .insert(key.as_bytes(), bytes)
            .map_err(to_storage_io)?;
        Ok(())
    }
}

impl DocumentStore for SledDocumentStore {
    fn fetch(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.documents
            .get(key.as_bytes())
            .map_err(to_storage_io)?
            .map(|raw| raw.to_vec())
            .ok_or_else(|| StorageError::DocumentNotFound(key.to_string()))
    }
}

/// Documents stored as files under a root directory; the key is a relative path.
#[derive(Debug, Clone)]
pub struct DirectoryDocumentStore {
    root: PathBuf,
}

impl DirectoryDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(StorageError::DocumentNotFound(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl DocumentStore for DirectoryDocumentStore {
    fn fetch(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::DocumentNotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::IoError(e)),
        }
    }
}

/// Text of pages `page_start..=page_end` (1-based). Pages past the end are ignored.
pub fn page_window_text(bytes: &[u8], page_start: u32, page_end: u32) -> String {
    let text = String::from_utf8_lossy(bytes);
    let skip = page_start.saturating_sub(1) as usize;
    let take = page_end.saturating_sub(page_start) as usize + 1;
    text.split(PAGE_SEPARATOR)
        .skip(skip)
        .take(take)
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
