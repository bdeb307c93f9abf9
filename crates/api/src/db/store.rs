//! Storage traits consumed by the service layer.
//!
//! Absence is a value (`Ok(None)`), never an error: only the service layer
//! decides whether a missing record is a failure.

use async_trait::async_trait;

use inventory_core::{
    CategoryId, CollectionId, Entity, Page, Product, ProductCategory, ProductCollection, Slug,
};

use super::RepositoryError;

/// Generic CRUD over one entity type.
#[async_trait]
pub trait CrudStore<E: Entity>: Send + Sync {
    /// Fetch a record by primary key.
    async fn get(&self, id: E::Id) -> Result<Option<E>, RepositoryError>;

    /// Fetch a window of records in insertion order.
    async fn get_multi(&self, page: Page) -> Result<Vec<E>, RepositoryError>;

    /// Insert a record; the store assigns id and timestamps.
    async fn create(&self, new: &E::New) -> Result<E, RepositoryError>;

    /// Write only the supplied fields of `changes` onto `current`.
    ///
    /// Returns [`RepositoryError::NotFound`] if `current` was deleted in the
    /// meantime.
    async fn update(&self, current: &E, changes: &E::Update) -> Result<E, RepositoryError>;

    /// Remove a record, returning it if it existed.
    async fn delete(&self, id: E::Id) -> Result<Option<E>, RepositoryError>;
}

/// Category-specific lookups.
#[async_trait]
pub trait CategoryStore: CrudStore<ProductCategory> {
    async fn get_by_name(&self, name: &str) -> Result<Option<ProductCategory>, RepositoryError>;

    async fn get_by_slug(&self, slug: &Slug) -> Result<Option<ProductCategory>, RepositoryError>;
}

/// Filter for collection listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionFilter {
    /// Only active (`Some(true)`) or inactive (`Some(false)`) collections.
    pub active: Option<bool>,
    /// Case-insensitive substring of the name.
    pub name_contains: Option<String>,
}

impl CollectionFilter {
    /// Whether `collection` passes this filter.
    #[must_use]
    pub fn matches(&self, collection: &ProductCollection) -> bool {
        let active_ok = self.active.is_none_or(|active| collection.is_active == active);
        let name_ok = self.name_contains.as_deref().is_none_or(|needle| {
            collection
                .name
                .as_str()
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        active_ok && name_ok
    }
}

/// Collection-specific lookups.
#[async_trait]
pub trait CollectionStore: CrudStore<ProductCollection> {
    async fn get_by_name(&self, name: &str) -> Result<Option<ProductCollection>, RepositoryError>;

    async fn get_by_slug(&self, slug: &Slug)
    -> Result<Option<ProductCollection>, RepositoryError>;

    /// List collections matching `filter`, in insertion order.
    async fn find(
        &self,
        filter: &CollectionFilter,
        page: Page,
    ) -> Result<Vec<ProductCollection>, RepositoryError>;
}

/// Product-specific lookups.
///
/// Product names are not unique; `get_by_name` returns the oldest match.
#[async_trait]
pub trait ProductStore: CrudStore<Product> {
    async fn get_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError>;

    async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError>;

    async fn get_by_category_id(
        &self,
        category_id: CategoryId,
        page: Page,
    ) -> Result<Vec<Product>, RepositoryError>;

    async fn get_by_collection_id(
        &self,
        collection_id: CollectionId,
        page: Page,
    ) -> Result<Vec<Product>, RepositoryError>;

    /// Products whose category has `slug` (join on the category relation).
    async fn get_by_category_slug(
        &self,
        slug: &Slug,
        page: Page,
    ) -> Result<Vec<Product>, RepositoryError>;

    /// Products whose collection has `slug` (join on the collection relation).
    async fn get_by_collection_slug(
        &self,
        slug: &Slug,
        page: Page,
    ) -> Result<Vec<Product>, RepositoryError>;
}

/// Backend liveness probe for readiness checks.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Everything the API needs from one backend.
pub trait CatalogStore: CategoryStore + CollectionStore + ProductStore + StoreHealth {}

impl<T> CatalogStore for T where T: CategoryStore + CollectionStore + ProductStore + StoreHealth {}
