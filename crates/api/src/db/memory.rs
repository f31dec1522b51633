//! In-process document store.
//!
//! Keeps every collection as an insertion-ordered vector behind a
//! `parking_lot::RwLock`. Used by the test suite and for local runs without
//! `PostgreSQL`.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use eko_store_core::DocumentId;

use super::{Document, DocumentStore, Filter, RepositoryError, StoredDocument};

/// Document store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<StoredDocument>>>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently in `collection`.
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collections.read().get(collection).map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find_all(&self, collection: &str) -> Result<Vec<StoredDocument>, RepositoryError> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> Result<Option<Document>, RepositoryError> {
        Ok(self.collections.read().get(collection).and_then(|docs| {
            docs.iter()
                .find(|doc| doc.id == id)
                .map(|doc| doc.body.clone())
        }))
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<StoredDocument>, RepositoryError> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.matches(&doc.body))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(
        &self,
        collection: &str,
        body: Document,
    ) -> Result<DocumentId, RepositoryError> {
        let id = DocumentId::generate();
        self.collections
            .write()
            .entry(collection.to_owned())
            .or_default()
            .push(StoredDocument { id, body });
        Ok(id)
    }

    async fn replace(
        &self,
        collection: &str,
        id: DocumentId,
        body: Document,
    ) -> Result<u64, RepositoryError> {
        let mut collections = self.collections.write();
        let Some(existing) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
        else {
            return Ok(0);
        };
        existing.body = body;
        Ok(1)
    }

    async fn delete(&self, collection: &str, id: DocumentId) -> Result<u64, RepositoryError> {
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|doc| doc.id != id);
        Ok(u64::from(docs.len() != before))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
