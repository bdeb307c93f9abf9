//! Product service.

use std::sync::Arc;

use inventory_core::{
    CategoryId, CollectionId, Entity, Page, Product, ProductCategory, ProductCollection,
    ProductCreate, ProductId, ProductUpdate, Slug,
};
use tracing::{info, instrument};

use super::{CatalogError, LookupKey, ensure_unique, log_failure, update_error};
use crate::db::{CategoryStore, CollectionStore, ProductStore};

const ENTITY: &str = Product::NAME;

/// Product operations. Products are addressed by id.
///
/// Needs the category and collection stores to check references.
#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductStore>,
    categories: Arc<dyn CategoryStore>,
    collections: Arc<dyn CollectionStore>,
}

impl ProductService {
    /// Create a new product service.
    #[must_use]
    pub fn new(
        products: Arc<dyn ProductStore>,
        categories: Arc<dyn CategoryStore>,
        collections: Arc<dyn CollectionStore>,
    ) -> Self {
        Self {
            products,
            categories,
            collections,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// List products in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    pub async fn list(&self, page: Page) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.get_multi(page).await?)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no product has this id.
    pub async fn get(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.products
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(ENTITY, LookupKey::Id(id.into())))
    }

    /// Get a product by slug.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no product has this slug.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Product, CatalogError> {
        self.products
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| CatalogError::not_found(ENTITY, LookupKey::Slug(slug.clone())))
    }

    /// Products in a category. An unknown category yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    pub async fn list_by_category_id(
        &self,
        category_id: CategoryId,
        page: Page,
    ) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.get_by_category_id(category_id, page).await?)
    }

    /// Products in a category, addressed by the category's slug.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    pub async fn list_by_category_slug(
        &self,
        slug: &Slug,
        page: Page,
    ) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.get_by_category_slug(slug, page).await?)
    }

    /// Products in a collection. An unknown collection yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    pub async fn list_by_collection_id(
        &self,
        collection_id: CollectionId,
        page: Page,
    ) -> Result<Vec<Product>, CatalogError> {
        Ok(self
            .products
            .get_by_collection_id(collection_id, page)
            .await?)
    }

    /// Products in a collection, addressed by the collection's slug.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    pub async fn list_by_collection_slug(
        &self,
        slug: &Slug,
        page: Page,
    ) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.get_by_collection_slug(slug, page).await?)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create a product.
    ///
    /// The slug must be free, the category must exist, and the collection
    /// (if given) must exist.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::AlreadyExists` for a taken slug and
    /// `CatalogError::InvalidReference` for a missing category or collection.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: ProductCreate) -> Result<Product, CatalogError> {
        let result = self.try_create(input).await;
        match &result {
            Ok(product) => {
                info!(product_id = %product.id, slug = %product.slug, "Product created");
            }
            Err(e) => log_failure("create product", e),
        }
        result
    }

    async fn try_create(&self, input: ProductCreate) -> Result<Product, CatalogError> {
        let new = input.into_new()?;

        let existing = self.products.get_by_slug(&new.slug).await?;
        ensure_unique(existing.as_ref(), None, LookupKey::Slug(new.slug.clone()))?;

        self.ensure_category_exists(new.category_id).await?;
        if let Some(collection_id) = new.collection_id {
            self.ensure_collection_exists(collection_id).await?;
        }

        Ok(self.products.create(&new).await?)
    }

    /// Apply a partial update to the product `id`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist,
    /// `CatalogError::AlreadyExists` if a changed slug is taken, and
    /// `CatalogError::InvalidReference` if a supplied category or collection
    /// does not exist.
    #[instrument(skip(self, changes), fields(product_id = %id))]
    pub async fn update(
        &self,
        id: ProductId,
        changes: ProductUpdate,
    ) -> Result<Product, CatalogError> {
        let result = self.try_update(id, &changes).await;
        match &result {
            Ok(_) => info!("Product updated"),
            Err(e) => log_failure("update product", e),
        }
        result
    }

    async fn try_update(
        &self,
        id: ProductId,
        changes: &ProductUpdate,
    ) -> Result<Product, CatalogError> {
        let current = self.get(id).await?;

        if let Some(new_slug) = changes.slug.as_ref().filter(|s| **s != current.slug) {
            let existing = self.products.get_by_slug(new_slug).await?;
            ensure_unique(
                existing.as_ref(),
                Some(current.id),
                LookupKey::Slug(new_slug.clone()),
            )?;
        }
        if let Some(category_id) = changes.category_id {
            self.ensure_category_exists(category_id).await?;
        }
        // `Some(None)` detaches the collection and needs no check.
        if let Some(Some(collection_id)) = changes.collection_id {
            self.ensure_collection_exists(collection_id).await?;
        }

        if changes.is_empty() {
            return Ok(current);
        }
        self.products
            .update(&current, changes)
            .await
            .map_err(update_error::<Product>(LookupKey::Id(id.into())))
    }

    /// Delete the product `id`, returning it.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: ProductId) -> Result<Product, CatalogError> {
        let result = self
            .products
            .delete(id)
            .await
            .map_err(CatalogError::from)
            .and_then(|deleted| {
                deleted.ok_or_else(|| CatalogError::not_found(ENTITY, LookupKey::Id(id.into())))
            });
        match &result {
            Ok(_) => info!("Product deleted"),
            Err(e) => log_failure("delete product", e),
        }
        result
    }

    async fn ensure_category_exists(&self, id: CategoryId) -> Result<(), CatalogError> {
        match self.categories.get(id).await? {
            Some(_) => Ok(()),
            None => Err(CatalogError::InvalidReference {
                entity: ProductCategory::NAME,
                id: id.into(),
            }),
        }
    }

    async fn ensure_collection_exists(&self, id: CollectionId) -> Result<(), CatalogError> {
        match self.collections.get(id).await? {
            Some(_) => Ok(()),
            None => Err(CatalogError::InvalidReference {
                entity: ProductCollection::NAME,
                id: id.into(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use inventory_core::{CategoryCreate, CollectionCreate};
    use serde_json::json;

    use super::*;
    use crate::db::MemoryStore;
    use crate::services::{CategoryService, CollectionService};

    struct Fixture {
        products: ProductService,
        categories: CategoryService,
        collections: CollectionService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        Fixture {
            products: ProductService::new(store.clone(), store.clone(), store.clone()),
            categories: CategoryService::new(store.clone()),
            collections: CollectionService::new(store),
        }
    }

    impl Fixture {
        async fn category(&self, name: &str) -> ProductCategory {
            let input: CategoryCreate = serde_json::from_value(json!({"name": name})).unwrap();
            self.categories.create(input).await.unwrap()
        }

        async fn collection(&self, name: &str) -> ProductCollection {
            let input: CollectionCreate = serde_json::from_value(json!({"name": name})).unwrap();
            self.collections.create(input).await.unwrap()
        }

        async fn product(&self, name: &str, category_id: CategoryId) -> Product {
            self.products
                .create(product_input(name, category_id))
                .await
                .unwrap()
        }
    }

    fn product_input(name: &str, category_id: CategoryId) -> ProductCreate {
        serde_json::from_value(json!({"name": name, "category_id": category_id})).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let f = fixture();
        let lighting = f.category("Lighting").await;
        let summer = f.collection("Summer").await;

        let input: ProductCreate = serde_json::from_value(json!({
            "name": "Desk Lamp",
            "description": "Warm light",
            "category_id": lighting.id,
            "collection_id": summer.id,
        }))
        .unwrap();
        let created = f.products.create(input).await.unwrap();

        let fetched = f.products.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.slug.as_str(), "desk-lamp");
        assert_eq!(fetched.description.as_deref(), Some("Warm light"));
        assert_eq!(fetched.collection_id, Some(summer.id));
    }

    #[tokio::test]
    async fn test_create_with_unknown_category() {
        let f = fixture();
        let missing = CategoryId::generate();

        let err = f
            .products
            .create(product_input("Lamp", missing))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidReference { .. }));
        assert_eq!(
            err.to_string(),
            format!("Category with ID '{missing}' does not exist")
        );
    }

    #[tokio::test]
    async fn test_create_with_unknown_collection() {
        let f = fixture();
        let lighting = f.category("Lighting").await;

        let input: ProductCreate = serde_json::from_value(json!({
            "name": "Lamp",
            "category_id": lighting.id,
            "collection_id": CollectionId::generate(),
        }))
        .unwrap();
        let err = f.products.create(input).await.unwrap_err();
        assert!(err.to_string().starts_with("Collection with ID"));
    }

    #[tokio::test]
    async fn test_create_duplicate_slug() {
        let f = fixture();
        let lighting = f.category("Lighting").await;
        f.product("Lamp", lighting.id).await;

        let err = f
            .products
            .create(product_input("Lamp", lighting.id))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Product with slug 'lamp' already exists");
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let f = fixture();
        let lighting = f.category("Lighting").await;
        let lamp = f.product("Lamp", lighting.id).await;

        let changes: ProductUpdate =
            serde_json::from_value(json!({"name": "Floor Lamp"})).unwrap();
        let updated = f.products.update(lamp.id, changes).await.unwrap();

        assert_eq!(updated.name.as_str(), "Floor Lamp");
        assert_eq!(updated.slug, lamp.slug);
        assert_eq!(updated.category_id, lamp.category_id);
        assert_eq!(updated.created_at, lamp.created_at);
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_category() {
        let f = fixture();
        let lighting = f.category("Lighting").await;
        let lamp = f.product("Lamp", lighting.id).await;

        let changes = ProductUpdate {
            category_id: Some(CategoryId::generate()),
            ..ProductUpdate::default()
        };
        let err = f.products.update(lamp.id, changes).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidReference { .. }));
    }

    #[tokio::test]
    async fn test_update_detaches_collection() {
        let f = fixture();
        let lighting = f.category("Lighting").await;
        let summer = f.collection("Summer").await;
        let input: ProductCreate = serde_json::from_value(json!({
            "name": "Lamp",
            "category_id": lighting.id,
            "collection_id": summer.id,
        }))
        .unwrap();
        let lamp = f.products.create(input).await.unwrap();

        let changes: ProductUpdate =
            serde_json::from_value(json!({"collection_id": null})).unwrap();
        let updated = f.products.update(lamp.id, changes).await.unwrap();
        assert_eq!(updated.collection_id, None);

        let in_summer = f
            .products
            .list_by_collection_id(summer.id, Page::first(10))
            .await
            .unwrap();
        assert!(in_summer.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let f = fixture();
        let err = f
            .products
            .update(ProductId::generate(), ProductUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let f = fixture();
        let lighting = f.category("Lighting").await;
        let lamp = f.product("Lamp", lighting.id).await;

        f.products.delete(lamp.id).await.unwrap();
        assert!(matches!(
            f.products.get(lamp.id).await.unwrap_err(),
            CatalogError::NotFound { .. }
        ));
        assert!(matches!(
            f.products.delete(lamp.id).await.unwrap_err(),
            CatalogError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let f = fixture();
        let lighting = f.category("Lighting").await;
        let seating = f.category("Seating").await;
        f.product("Lamp", lighting.id).await;
        f.product("Chair", seating.id).await;

        let by_id = f
            .products
            .list_by_category_id(lighting.id, Page::first(10))
            .await
            .unwrap();
        let by_slug = f
            .products
            .list_by_category_slug(&lighting.slug, Page::first(10))
            .await
            .unwrap();
        assert_eq!(by_id, by_slug);
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].name.as_str(), "Lamp");
    }

    #[tokio::test]
    async fn test_category_with_products_cannot_be_deleted() {
        let f = fixture();
        let lighting = f.category("Lighting").await;
        f.product("Lamp", lighting.id).await;

        let err = f.categories.delete(&lighting.slug).await.unwrap_err();
        assert!(matches!(err, CatalogError::Repository(_)));
    }
}
