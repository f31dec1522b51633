//! User repository for database operations.
//!
//! Users live in the `users` collection and are keyed by their GitHub account
//! ID. The repository is the only writer of that collection.

use eko_store_core::{DocumentId, UserId};

use super::{Collection, Filter, Gateway, RepositoryError};
use crate::models::{Entity, Stored, User};

/// Repository for user database operations.
pub struct UserRepository {
    users: Collection,
}

impl UserRepository {
    /// Create a new user repository.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotInitialized` if the gateway has no store.
    pub fn new(gateway: &Gateway) -> Result<Self, RepositoryError> {
        Ok(Self {
            users: gateway.collection(User::COLLECTION)?,
        })
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored document is invalid.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<Stored<User>>, RepositoryError> {
        let Some(body) = self.users.find_by_id(DocumentId::from(id)).await? else {
            return Ok(None);
        };
        Ok(Some(Stored {
            id: id.into(),
            entity: User::from_document(body)?,
        }))
    }

    /// Get a user by their GitHub account ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored document is invalid.
    pub async fn find_by_github_id(
        &self,
        github_id: &str,
    ) -> Result<Option<Stored<User>>, RepositoryError> {
        let mut matches = self
            .users
            .find(&Filter::eq("githubId", github_id))
            .await?
            .into_iter();

        let Some(first) = matches.next() else {
            return Ok(None);
        };
        if matches.next().is_some() {
            tracing::warn!(github_id, "Multiple users share one GitHub ID; using the oldest");
        }
        Stored::from_stored(first).map(Some)
    }

    /// Insert the user, or refresh the existing record with the same GitHub ID.
    ///
    /// The stored profile fields and access token are overwritten with the
    /// latest values; the document ID is kept.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored document is invalid.
    pub async fn upsert_by_github_id(&self, user: User) -> Result<Stored<User>, RepositoryError> {
        let body = user.to_document()?;

        if let Some(existing) = self.find_by_github_id(&user.github_id).await? {
            let matched = self.users.replace(existing.id, body).await?;
            if matched > 0 {
                tracing::debug!(user_id = %existing.id, "Refreshed user");
                return Ok(Stored {
                    id: existing.id,
                    entity: user,
                });
            }
            // Deleted between the lookup and the replace; fall through and insert.
            let body = user.to_document()?;
            let id = self.users.insert(body).await?;
            return Ok(Stored { id, entity: user });
        }

        let id = self.users.insert(body).await?;
        tracing::info!(user_id = %id, username = %user.username, "Created user");
        Ok(Stored { id, entity: user })
    }
}
