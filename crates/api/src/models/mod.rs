//! Domain models.
//!
//! Each persisted type implements [`Entity`], which names its collection and
//! converts to and from document bodies. Types writable over HTTP also
//! implement [`Resource`] and know how to build themselves from an untyped
//! request body. Responses wrap an entity in [`Stored`], which adds the
//! generated `_id`.

pub mod customer;
pub mod product;
pub mod review;
pub mod session;
pub mod user;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use eko_store_core::DocumentId;

use crate::db::{Document, RepositoryError, StoredDocument};
use crate::validation::ValidationErrors;

pub use customer::Customer;
pub use product::Product;
pub use review::Review;
pub use session::{AuthEvent, AuthState, CurrentUser, InvalidTransition, session_keys};
pub use user::{ProfileEmail, User, UserProfile};

/// A persistable entity type.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Document collection holding this entity.
    const COLLECTION: &'static str;

    /// Singular name used in log lines and not-found messages.
    const NAME: &'static str;

    /// Serialize into a document body.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the entity does not
    /// serialize to a JSON object.
    fn to_document(&self) -> Result<Document, RepositoryError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(RepositoryError::DataCorruption(format!(
                "{} serialized to a non-object: {other}",
                Self::NAME
            ))),
            Err(e) => Err(RepositoryError::DataCorruption(e.to_string())),
        }
    }

    /// Rebuild an entity from a stored body.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the body does not match
    /// the entity's shape.
    fn from_document(body: Document) -> Result<Self, RepositoryError> {
        serde_json::from_value(Value::Object(body)).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid {} document: {e}", Self::NAME))
        })
    }
}

/// An entity that clients create and replace through the API.
pub trait Resource: Entity {
    /// Validate an untyped body and build the entity.
    ///
    /// Implementations must report every violated field, and must apply any
    /// normalization (such as lowercasing) here so that it holds for every
    /// write path.
    ///
    /// # Errors
    ///
    /// Returns every field violation found.
    fn from_input(input: &Value) -> Result<Self, ValidationErrors>;

    /// Carry values the client left out of a full replacement over from the
    /// stored entity. Nothing is carried over by default.
    fn retain_from(&mut self, _previous: &Self, _input: &Value) {}
}

/// An entity with its generated identity, as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<R> {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(flatten)]
    pub entity: R,
}

impl<R: Entity> Stored<R> {
    /// Decode a stored document into its entity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the body is malformed.
    pub fn from_stored(doc: StoredDocument) -> Result<Self, RepositoryError> {
        Ok(Self {
            id: doc.id,
            entity: R::from_document(doc.body)?,
        })
    }
}
