//! Generic resource service.
//!
//! Products, customers and reviews share one lifecycle: validate the input,
//! write it to the entity's collection, and hand back the stored form with
//! its generated `_id`. Validation always runs before any store access, so a
//! rejected input never touches the collection.

use std::marker::PhantomData;

use serde_json::Value;
use thiserror::Error;

use eko_store_core::DocumentId;

use crate::db::{Collection, Filter, Gateway, RepositoryError};
use crate::models::{Resource, Review, Stored, review::normalize_name};
use crate::validation::ValidationErrors;

/// Errors returned by resource operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The input failed validation; nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// No document with the given ID.
    #[error("{0} not found")]
    NotFound(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Validate -> persist -> respond for one entity type.
pub struct ResourceService<R> {
    collection: Collection,
    _entity: PhantomData<fn() -> R>,
}

impl<R: Resource> ResourceService<R> {
    /// Bind a service to the entity's collection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotInitialized` if the gateway has no store.
    pub fn new(gateway: &Gateway) -> Result<Self, ServiceError> {
        Ok(Self {
            collection: gateway.collection(R::COLLECTION)?,
            _entity: PhantomData,
        })
    }

    fn not_found() -> ServiceError {
        ServiceError::NotFound(capitalize(R::NAME))
    }

    /// Malformed IDs cannot name any document, so they are reported as not found.
    fn parse_id(id: &str) -> Result<DocumentId, ServiceError> {
        DocumentId::parse(id).map_err(|_| Self::not_found())
    }

    /// All entities, in storage order.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn list(&self) -> Result<Vec<Stored<R>>, ServiceError> {
        self.collection
            .find_all()
            .await?
            .into_iter()
            .map(|doc| Stored::from_stored(doc).map_err(ServiceError::from))
            .collect()
    }

    /// One entity by ID.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no document has that ID.
    pub async fn get(&self, id: &str) -> Result<Stored<R>, ServiceError> {
        let id = Self::parse_id(id)?;
        let body = self
            .collection
            .find_by_id(id)
            .await?
            .ok_or_else(Self::not_found)?;
        Ok(Stored {
            id,
            entity: R::from_document(body)?,
        })
    }

    /// Validate and insert a new entity.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` with every violated field.
    pub async fn create(&self, input: &Value) -> Result<Stored<R>, ServiceError> {
        let entity = R::from_input(input)?;
        let id = self.collection.insert(entity.to_document()?).await?;
        tracing::info!(collection = R::COLLECTION, %id, "Created {}", R::NAME);
        Ok(Stored { id, entity })
    }

    /// Validate and fully replace an existing entity.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` before checking existence, then
    /// `ServiceError::NotFound` if no document has that ID.
    pub async fn update(&self, id: &str, input: &Value) -> Result<(), ServiceError> {
        let mut entity = R::from_input(input)?;
        let id = Self::parse_id(id)?;
        let previous = self
            .collection
            .find_by_id(id)
            .await?
            .ok_or_else(Self::not_found)?;
        entity.retain_from(&R::from_document(previous)?, input);

        let matched = self.collection.replace(id, entity.to_document()?).await?;
        if matched == 0 {
            return Err(Self::not_found());
        }
        tracing::info!(collection = R::COLLECTION, %id, "Replaced {}", R::NAME);
        Ok(())
    }

    /// Remove an entity.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no document has that ID.
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let id = Self::parse_id(id)?;
        if self.collection.delete(id).await? == 0 {
            return Err(Self::not_found());
        }
        tracing::info!(collection = R::COLLECTION, %id, "Deleted {}", R::NAME);
        Ok(())
    }
}

impl ResourceService<Review> {
    /// Every review of the named product, matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a blank name.
    pub async fn find_by_name(&self, name: &str) -> Result<Vec<Stored<Review>>, ServiceError> {
        if name.trim().is_empty() {
            return Err(ValidationErrors::single("name", "Name is required").into());
        }
        self.collection
            .find(&Filter::eq("name", normalize_name(name)))
            .await?
            .into_iter()
            .map(|doc| Stored::from_stored(doc).map_err(ServiceError::from))
            .collect()
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::MemoryDocumentStore;
    use crate::models::{Customer, Product};

    fn widget() -> Value {
        json!({
            "name": "Widget",
            "description": "d",
            "price": 9.99,
            "stock": 5,
            "category": "misc",
            "imageUrl": "https://x/y.png",
        })
    }

    fn gateway() -> Gateway {
        Gateway::with_store(MemoryDocumentStore::new())
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips() {
        let gateway = gateway();
        let products = ResourceService::<Product>::new(&gateway).unwrap();

        let created = products.create(&widget()).await.unwrap();
        let fetched = products.get(&created.id.to_string()).await.unwrap();
        assert_eq!(fetched, created);

        let json = serde_json::to_value(&fetched).unwrap();
        assert_eq!(json["_id"], json!(created.id.to_string()));
        assert_eq!(json["name"], "Widget");
        assert_eq!(json["price"], json!(9.99));
        assert_eq!(json["stock"], 5);
        assert_eq!(json["imageUrl"], "https://x/y.png");
    }

    #[tokio::test]
    async fn test_invalid_create_persists_nothing() {
        let gateway = gateway();
        let products = ResourceService::<Product>::new(&gateway).unwrap();

        let mut input = widget();
        input["price"] = json!(-1);
        input["stock"] = json!(-3);

        let err = products.create(&input).await.unwrap_err();
        let ServiceError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors.fields(), vec!["price", "stock"]);
        assert!(products.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let gateway = gateway();
        let products = ResourceService::<Product>::new(&gateway).unwrap();
        let unknown = DocumentId::generate().to_string();

        assert!(matches!(
            products.get(&unknown).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            products.update(&unknown, &widget()).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            products.delete(&unknown).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            products.get("not-an-id").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_validates_before_existence() {
        let gateway = gateway();
        let customers = ResourceService::<Customer>::new(&gateway).unwrap();

        let err = customers
            .update(&DocumentId::generate().to_string(), &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_replaces_whole_document() {
        let gateway = gateway();
        let products = ResourceService::<Product>::new(&gateway).unwrap();
        let created = products.create(&widget()).await.unwrap();
        let id = created.id.to_string();

        let mut replacement = widget();
        replacement["name"] = json!("Gadget");
        replacement["stock"] = json!(0);
        products.update(&id, &replacement).await.unwrap();

        let fetched = products.get(&id).await.unwrap();
        assert_eq!(fetched.entity.name, "Gadget");
        assert_eq!(fetched.entity.stock, 0);
    }

    #[tokio::test]
    async fn test_update_keeps_creation_time_unless_given() {
        let gateway = gateway();
        let products = ResourceService::<Product>::new(&gateway).unwrap();
        let mut input = widget();
        input["createdAt"] = json!("2025-04-13T10:00:00Z");
        let id = products.create(&input).await.unwrap().id.to_string();

        products.update(&id, &widget()).await.unwrap();
        let kept = products.get(&id).await.unwrap();
        assert_eq!(kept.entity.created_at.to_rfc3339(), "2025-04-13T10:00:00+00:00");

        let mut restamped = widget();
        restamped["createdAt"] = json!("2025-05-01");
        products.update(&id, &restamped).await.unwrap();
        let replaced = products.get(&id).await.unwrap();
        assert_eq!(
            replaced.entity.created_at.to_rfc3339(),
            "2025-05-01T00:00:00+00:00"
        );
    }

    #[tokio::test]
    async fn test_delete_removes_document() {
        let gateway = gateway();
        let products = ResourceService::<Product>::new(&gateway).unwrap();
        let id = products.create(&widget()).await.unwrap().id.to_string();

        products.delete(&id).await.unwrap();
        assert!(matches!(
            products.get(&id).await,
            Err(ServiceError::NotFound(message)) if message == "Product"
        ));
    }

    #[tokio::test]
    async fn test_list_keeps_storage_order() {
        let gateway = gateway();
        let products = ResourceService::<Product>::new(&gateway).unwrap();
        for name in ["a", "b", "c"] {
            let mut input = widget();
            input["name"] = json!(name);
            products.create(&input).await.unwrap();
        }

        let names: Vec<_> = products
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.entity.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_reviews_found_by_name_case_insensitively() {
        let gateway = gateway();
        let reviews = ResourceService::<Review>::new(&gateway).unwrap();

        let created = reviews
            .create(&json!({
                "name": "Food",
                "email": "john@gmail.com",
                "rating": 5,
                "comment": "This is an awesome item",
            }))
            .await
            .unwrap();
        assert_eq!(created.entity.name, "food");

        for query in ["food", "FOOD", "Food"] {
            let found = reviews.find_by_name(query).await.unwrap();
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].id, created.id);
        }
        assert!(reviews.find_by_name("drink").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_review_name_is_rejected() {
        let gateway = gateway();
        let reviews = ResourceService::<Review>::new(&gateway).unwrap();
        assert!(matches!(
            reviews.find_by_name("  ").await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_disconnected_gateway() {
        assert!(matches!(
            ResourceService::<Product>::new(&Gateway::disconnected()),
            Err(ServiceError::Repository(RepositoryError::NotInitialized))
        ));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("product"), "Product");
        assert_eq!(capitalize(""), "");
    }
}
