//! Collection service.

use std::sync::Arc;

use inventory_core::{CollectionCreate, CollectionUpdate, Entity, Page, ProductCollection, Slug};
use tracing::{info, instrument};

use super::{CatalogError, LookupKey, ensure_unique, log_failure, update_error};
use crate::db::{CollectionFilter, CollectionStore};

const ENTITY: &str = ProductCollection::NAME;

/// Collection operations. Collections are addressed by slug.
#[derive(Clone)]
pub struct CollectionService {
    store: Arc<dyn CollectionStore>,
}

impl CollectionService {
    /// Create a new collection service.
    #[must_use]
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    /// List collections in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    pub async fn list(&self, page: Page) -> Result<Vec<ProductCollection>, CatalogError> {
        Ok(self.store.get_multi(page).await?)
    }

    /// List collections matching `filter` (active flag, name substring).
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    pub async fn find(
        &self,
        filter: &CollectionFilter,
        page: Page,
    ) -> Result<Vec<ProductCollection>, CatalogError> {
        Ok(self.store.find(filter, page).await?)
    }

    /// Get a collection by slug.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no collection has this slug.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<ProductCollection, CatalogError> {
        self.store
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| CatalogError::not_found(ENTITY, LookupKey::Slug(slug.clone())))
    }

    /// Create a collection after checking slug and name are free.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::AlreadyExists` if the slug or name is taken.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CollectionCreate) -> Result<ProductCollection, CatalogError> {
        let result = self.try_create(input).await;
        match &result {
            Ok(collection) => {
                info!(collection_id = %collection.id, slug = %collection.slug, "Collection created");
            }
            Err(e) => log_failure("create collection", e),
        }
        result
    }

    async fn try_create(&self, input: CollectionCreate) -> Result<ProductCollection, CatalogError> {
        let new = input.into_new()?;

        let existing = self.store.get_by_slug(&new.slug).await?;
        ensure_unique(existing.as_ref(), None, LookupKey::Slug(new.slug.clone()))?;

        let existing = self.store.get_by_name(new.name.as_str()).await?;
        ensure_unique(existing.as_ref(), None, LookupKey::Name(new.name.to_string()))?;

        Ok(self.store.create(&new).await?)
    }

    /// Apply a partial update to the collection at `slug`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no collection has `slug`, and
    /// `CatalogError::AlreadyExists` if a changed slug or name is taken.
    #[instrument(skip(self, changes), fields(slug = %slug))]
    pub async fn update(
        &self,
        slug: &Slug,
        changes: CollectionUpdate,
    ) -> Result<ProductCollection, CatalogError> {
        let result = self.try_update(slug, &changes).await;
        match &result {
            Ok(collection) => info!(collection_id = %collection.id, "Collection updated"),
            Err(e) => log_failure("update collection", e),
        }
        result
    }

    async fn try_update(
        &self,
        slug: &Slug,
        changes: &CollectionUpdate,
    ) -> Result<ProductCollection, CatalogError> {
        changes.validate()?;
        let current = self.get_by_slug(slug).await?;

        if let Some(new_slug) = changes.slug.as_ref().filter(|s| **s != current.slug) {
            let existing = self.store.get_by_slug(new_slug).await?;
            ensure_unique(
                existing.as_ref(),
                Some(current.id),
                LookupKey::Slug(new_slug.clone()),
            )?;
        }
        if let Some(new_name) = changes.name.as_ref().filter(|n| **n != current.name) {
            let existing = self.store.get_by_name(new_name.as_str()).await?;
            ensure_unique(
                existing.as_ref(),
                Some(current.id),
                LookupKey::Name(new_name.to_string()),
            )?;
        }

        if changes.is_empty() {
            return Ok(current);
        }
        self.store
            .update(&current, changes)
            .await
            .map_err(update_error::<ProductCollection>(LookupKey::Slug(slug.clone())))
    }

    /// Mark the collection at `slug` active.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no collection has `slug`.
    pub async fn activate(&self, slug: &Slug) -> Result<ProductCollection, CatalogError> {
        self.set_active(slug, true).await
    }

    /// Mark the collection at `slug` inactive. Its products are untouched.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no collection has `slug`.
    pub async fn deactivate(&self, slug: &Slug) -> Result<ProductCollection, CatalogError> {
        self.set_active(slug, false).await
    }

    async fn set_active(
        &self,
        slug: &Slug,
        is_active: bool,
    ) -> Result<ProductCollection, CatalogError> {
        let changes = CollectionUpdate {
            is_active: Some(is_active),
            ..CollectionUpdate::default()
        };
        self.update(slug, changes).await
    }

    /// Delete the collection at `slug`, returning it.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no collection has `slug`, and
    /// `CatalogError::Repository` with a conflict if products still reference it.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn delete(&self, slug: &Slug) -> Result<ProductCollection, CatalogError> {
        let result = self.try_delete(slug).await;
        match &result {
            Ok(collection) => info!(collection_id = %collection.id, "Collection deleted"),
            Err(e) => log_failure("delete collection", e),
        }
        result
    }

    async fn try_delete(&self, slug: &Slug) -> Result<ProductCollection, CatalogError> {
        let current = self.get_by_slug(slug).await?;
        self.store
            .delete(current.id)
            .await?
            .ok_or_else(|| CatalogError::not_found(ENTITY, LookupKey::Slug(slug.clone())))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::MemoryStore;

    fn service() -> CollectionService {
        CollectionService::new(Arc::new(MemoryStore::new()))
    }

    async fn create(service: &CollectionService, name: &str) -> ProductCollection {
        let input: CollectionCreate = serde_json::from_value(json!({"name": name})).unwrap();
        service.create(input).await.unwrap()
    }

    fn slug(s: &str) -> Slug {
        Slug::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_create_derives_slug() {
        let service = service();
        let created = create(&service, "Summer Sale").await;
        assert_eq!(created.slug.as_str(), "summer-sale");

        let fetched = service.get_by_slug(&slug("summer-sale")).await.unwrap();
        assert_eq!(fetched.id, created.id);
    }

    #[tokio::test]
    async fn test_create_duplicate_name_with_different_slug() {
        let service = service();
        create(&service, "Summer").await;

        let input: CollectionCreate =
            serde_json::from_value(json!({"name": "Summer", "slug": "summer-2"})).unwrap();
        let err = service.create(input).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Collection with name 'Summer' already exists"
        );
    }

    #[tokio::test]
    async fn test_create_duplicate_slug_reports_requested_slug() {
        let service = service();
        create(&service, "Summer Sale").await;

        let input: CollectionCreate =
            serde_json::from_value(json!({"name": "Sale", "slug": "summer-sale"})).unwrap();
        let err = service.create(input).await.unwrap_err();
        match err {
            CatalogError::AlreadyExists { entity, key } => {
                assert_eq!(entity, "Collection");
                assert_eq!(key, LookupKey::Slug(slug("summer-sale")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_name_taken_by_other() {
        let service = service();
        create(&service, "Summer").await;
        create(&service, "Winter").await;

        let changes: CollectionUpdate = serde_json::from_value(json!({"name": "Summer"})).unwrap();
        let err = service.update(&slug("winter"), changes).await.unwrap_err();
        assert!(matches!(err, CatalogError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_update_clears_description() {
        let service = service();
        let input: CollectionCreate = serde_json::from_value(
            json!({"name": "Summer", "description": "Hot picks"}),
        )
        .unwrap();
        service.create(input).await.unwrap();

        let changes: CollectionUpdate =
            serde_json::from_value(json!({"description": null})).unwrap();
        let updated = service.update(&slug("summer"), changes).await.unwrap();
        assert_eq!(updated.description, None);
        assert_eq!(updated.name.as_str(), "Summer");
    }

    #[tokio::test]
    async fn test_activate_and_deactivate() {
        let service = service();
        create(&service, "Summer").await;

        let inactive = service.deactivate(&slug("summer")).await.unwrap();
        assert!(!inactive.is_active);

        let active = service.activate(&slug("summer")).await.unwrap();
        assert!(active.is_active);

        let err = service.activate(&slug("winter")).await.unwrap_err();
        assert_eq!(err.to_string(), "Collection with slug 'winter' not found");
    }

    #[tokio::test]
    async fn test_find_filters() {
        let service = service();
        create(&service, "Summer Sale").await;
        create(&service, "Winter Sale").await;
        create(&service, "Clearance").await;
        service.deactivate(&slug("winter-sale")).await.unwrap();

        let filter = CollectionFilter {
            active: Some(true),
            name_contains: Some("sale".to_string()),
        };
        let found = service.find(&filter, Page::first(10)).await.unwrap();
        let names: Vec<_> = found.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Summer Sale"]);
    }

    #[tokio::test]
    async fn test_list_pages_are_disjoint() {
        let service = service();
        for i in 0..10 {
            create(&service, &format!("Collection {i}")).await;
        }

        let first = service.list(Page::new(0, 5)).await.unwrap();
        let second = service.list(Page::new(5, 5)).await.unwrap();
        assert_eq!(first.len(), 5);
        assert_eq!(second.len(), 5);

        let mut ids: Vec<_> = first.iter().chain(&second).map(|c| c.id).collect();
        ids.sort_by_key(|id| id.as_uuid());
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }
}
