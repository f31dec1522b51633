//! Persistence gateway over a document store.
//!
//! # Collections
//!
//! - `products` - Catalogue entries
//! - `customers` - Customer records
//! - `reviews` - Product reviews, keyed by lowercased product name
//! - `users` - GitHub identities that have logged in
//!
//! Every collection is a sequence of JSON object documents, each with a
//! generated [`DocumentId`]. The gateway is constructed once at startup and
//! injected into [`AppState`](crate::state::AppState); a gateway that never
//! connected answers every call with [`RepositoryError::NotInitialized`].
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p eko-store-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use eko_store_core::DocumentId;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use users::UserRepository;

/// A stored document body: a JSON object without its `_id`.
pub type Document = serde_json::Map<String, Value>;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The gateway was used before a store was connected.
    #[error("database not initialized")]
    NotInitialized,

    /// The store could not be reached.
    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// A document together with its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub body: Document,
}

/// Equality filter: every listed field must equal the given value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Document,
}

impl Filter {
    /// Create a filter that matches documents where `field == value`.
    #[must_use]
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self::default().and(field, value)
    }

    /// Add another `field == value` condition.
    #[must_use]
    pub fn and(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_owned(), value.into());
        self
    }

    /// Whether a document satisfies every condition.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        self.fields
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }

    /// The filter as a JSON object (used for JSONB containment).
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// The minimal set of primitives a document store has to provide.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of a collection, in storage order.
    async fn find_all(&self, collection: &str) -> Result<Vec<StoredDocument>, RepositoryError>;

    /// A single document by ID.
    async fn find_by_id(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> Result<Option<Document>, RepositoryError>;

    /// Documents matching a filter, in storage order.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<StoredDocument>, RepositoryError>;

    /// Insert a document and return its generated ID.
    async fn insert(&self, collection: &str, body: Document)
    -> Result<DocumentId, RepositoryError>;

    /// Replace the whole body of a document. Returns the number of matched documents.
    async fn replace(
        &self,
        collection: &str,
        id: DocumentId,
        body: Document,
    ) -> Result<u64, RepositoryError>;

    /// Delete a document. Returns the number of matched documents.
    async fn delete(&self, collection: &str, id: DocumentId) -> Result<u64, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Process-wide handle to the document store.
///
/// Cheap to clone; every clone shares the same underlying store.
#[derive(Clone, Default)]
pub struct Gateway {
    store: Option<Arc<dyn DocumentStore>>,
}

impl Gateway {
    /// A gateway with no store behind it.
    #[must_use]
    pub const fn disconnected() -> Self {
        Self { store: None }
    }

    /// Wrap an already constructed store.
    #[must_use]
    pub fn with_store(store: impl DocumentStore + 'static) -> Self {
        Self {
            store: Some(Arc::new(store)),
        }
    }

    /// Connect to `PostgreSQL` and wrap the pool in a [`PgDocumentStore`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Connection` if the database is unreachable.
    pub async fn connect(database_url: &secrecy::SecretString) -> Result<Self, RepositoryError> {
        let pool = create_pool(database_url)
            .await
            .map_err(RepositoryError::Connection)?;
        Ok(Self::with_store(PgDocumentStore::new(pool)))
    }

    /// Whether a store is attached.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.store.is_some()
    }

    /// A handle on one collection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotInitialized` if no store is attached.
    pub fn collection(&self, name: &'static str) -> Result<Collection, RepositoryError> {
        let store = self
            .store
            .clone()
            .ok_or(RepositoryError::NotInitialized)?;
        Ok(Collection { name, store })
    }

    /// Check that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotInitialized` or the store's error.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        match &self.store {
            Some(store) => store.ping().await,
            None => Err(RepositoryError::NotInitialized),
        }
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// CRUD primitives bound to a single collection.
#[derive(Clone)]
pub struct Collection {
    name: &'static str,
    store: Arc<dyn DocumentStore>,
}

impl Collection {
    /// The collection name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// All documents, in storage order.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub async fn find_all(&self) -> Result<Vec<StoredDocument>, RepositoryError> {
        self.store.find_all(self.name).await
    }

    /// A single document by ID.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub async fn find_by_id(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError> {
        self.store.find_by_id(self.name, id).await
    }

    /// Documents matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub async fn find(&self, filter: &Filter) -> Result<Vec<StoredDocument>, RepositoryError> {
        self.store.find(self.name, filter).await
    }

    /// Insert a document, returning its generated ID.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub async fn insert(&self, body: Document) -> Result<DocumentId, RepositoryError> {
        self.store.insert(self.name, body).await
    }

    /// Replace a document's body. Returns the matched count (0 or 1).
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub async fn replace(&self, id: DocumentId, body: Document) -> Result<u64, RepositoryError> {
        self.store.replace(self.name, id, body).await
    }

    /// Delete a document. Returns the matched count (0 or 1).
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub async fn delete(&self, id: DocumentId) -> Result<u64, RepositoryError> {
        self.store.delete(self.name, id).await
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
