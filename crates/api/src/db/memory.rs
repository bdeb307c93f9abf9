//! In-process catalog store for tests.
//!
//! Enforces the same integrity rules as the `PostgreSQL` schema (unique
//! name/slug, product foreign keys, `ON DELETE RESTRICT`) and reports
//! violations with the same constraint names, so service and HTTP tests can
//! exercise the conflict backstop without a database.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use inventory_core::{
    CategoryId, CollectionId, Entity, NewCategory, NewCollection, NewProduct, Page, Product,
    ProductCategory, ProductCollection, ProductId, Slug,
};

use super::RepositoryError;
use super::store::{
    CategoryStore, CollectionFilter, CollectionStore, CrudStore, ProductStore, StoreHealth,
};

/// All three tables, in insertion order, behind one lock.
#[derive(Debug, Default)]
pub struct MemoryTables {
    categories: Vec<ProductCategory>,
    collections: Vec<ProductCollection>,
    products: Vec<Product>,
}

/// Catalog store that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<MemoryTables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryTables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn conflict(constraint: &str) -> RepositoryError {
    RepositoryError::Conflict(constraint.to_string())
}

/// Row bookkeeping shared by the generic CRUD implementation.
pub trait MemoryEntity: Entity {
    fn rows(tables: &MemoryTables) -> &[Self];

    fn rows_mut(tables: &mut MemoryTables) -> &mut Vec<Self>;

    fn build(new: &Self::New, now: DateTime<Utc>) -> Self;

    fn apply(&mut self, changes: &Self::Update, now: DateTime<Utc>);

    /// Unique and foreign-key checks for `candidate` against every other row.
    fn check_integrity(tables: &MemoryTables, candidate: &Self) -> Result<(), RepositoryError>;

    /// `ON DELETE RESTRICT` check.
    fn check_unreferenced(tables: &MemoryTables, id: Self::Id) -> Result<(), RepositoryError>;
}

fn touch(updated_at: &mut DateTime<Utc>, created_at: DateTime<Utc>, now: DateTime<Utc>) {
    *updated_at = now.max(created_at);
}

impl MemoryEntity for ProductCategory {
    fn rows(tables: &MemoryTables) -> &[Self] {
        &tables.categories
    }

    fn rows_mut(tables: &mut MemoryTables) -> &mut Vec<Self> {
        &mut tables.categories
    }

    fn build(new: &NewCategory, now: DateTime<Utc>) -> Self {
        Self {
            id: CategoryId::generate(),
            name: new.name.clone(),
            slug: new.slug.clone(),
            description: new.description.clone(),
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, changes: &Self::Update, now: DateTime<Utc>) {
        changes.apply(self);
        touch(&mut self.updated_at, self.created_at, now);
    }

    fn check_integrity(tables: &MemoryTables, candidate: &Self) -> Result<(), RepositoryError> {
        let others = tables.categories.iter().filter(|c| c.id != candidate.id);
        for other in others {
            if other.name == candidate.name {
                return Err(conflict("product_categories_name_key"));
            }
            if other.slug == candidate.slug {
                return Err(conflict("product_categories_slug_key"));
            }
        }
        Ok(())
    }

    fn check_unreferenced(tables: &MemoryTables, id: CategoryId) -> Result<(), RepositoryError> {
        if tables.products.iter().any(|p| p.category_id == id) {
            return Err(conflict("products_category_id_fkey"));
        }
        Ok(())
    }
}

impl MemoryEntity for ProductCollection {
    fn rows(tables: &MemoryTables) -> &[Self] {
        &tables.collections
    }

    fn rows_mut(tables: &mut MemoryTables) -> &mut Vec<Self> {
        &mut tables.collections
    }

    fn build(new: &NewCollection, now: DateTime<Utc>) -> Self {
        Self {
            id: CollectionId::generate(),
            name: new.name.clone(),
            slug: new.slug.clone(),
            description: new.description.clone(),
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, changes: &Self::Update, now: DateTime<Utc>) {
        changes.apply(self);
        touch(&mut self.updated_at, self.created_at, now);
    }

    fn check_integrity(tables: &MemoryTables, candidate: &Self) -> Result<(), RepositoryError> {
        let others = tables.collections.iter().filter(|c| c.id != candidate.id);
        for other in others {
            if other.name == candidate.name {
                return Err(conflict("product_collections_name_key"));
            }
            if other.slug == candidate.slug {
                return Err(conflict("product_collections_slug_key"));
            }
        }
        Ok(())
    }

    fn check_unreferenced(tables: &MemoryTables, id: CollectionId) -> Result<(), RepositoryError> {
        if tables.products.iter().any(|p| p.collection_id == Some(id)) {
            return Err(conflict("products_collection_id_fkey"));
        }
        Ok(())
    }
}

impl MemoryEntity for Product {
    fn rows(tables: &MemoryTables) -> &[Self] {
        &tables.products
    }

    fn rows_mut(tables: &mut MemoryTables) -> &mut Vec<Self> {
        &mut tables.products
    }

    fn build(new: &NewProduct, now: DateTime<Utc>) -> Self {
        Self {
            id: ProductId::generate(),
            name: new.name.clone(),
            slug: new.slug.clone(),
            description: new.description.clone(),
            category_id: new.category_id,
            collection_id: new.collection_id,
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, changes: &Self::Update, now: DateTime<Utc>) {
        changes.apply(self);
        touch(&mut self.updated_at, self.created_at, now);
    }

    fn check_integrity(tables: &MemoryTables, candidate: &Self) -> Result<(), RepositoryError> {
        if tables
            .products
            .iter()
            .any(|p| p.id != candidate.id && p.slug == candidate.slug)
        {
            return Err(conflict("products_slug_key"));
        }
        if !tables
            .categories
            .iter()
            .any(|c| c.id == candidate.category_id)
        {
            return Err(conflict("products_category_id_fkey"));
        }
        if let Some(collection_id) = candidate.collection_id
            && !tables.collections.iter().any(|c| c.id == collection_id)
        {
            return Err(conflict("products_collection_id_fkey"));
        }
        Ok(())
    }

    fn check_unreferenced(_tables: &MemoryTables, _id: ProductId) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[async_trait]
impl<E: MemoryEntity> CrudStore<E> for MemoryStore {
    async fn get(&self, id: E::Id) -> Result<Option<E>, RepositoryError> {
        let tables = self.lock();
        Ok(E::rows(&tables).iter().find(|row| row.id() == id).cloned())
    }

    async fn get_multi(&self, page: Page) -> Result<Vec<E>, RepositoryError> {
        let tables = self.lock();
        Ok(page.apply(E::rows(&tables).iter()).cloned().collect())
    }

    async fn create(&self, new: &E::New) -> Result<E, RepositoryError> {
        let mut tables = self.lock();
        let row = E::build(new, Utc::now());
        E::check_integrity(&tables, &row)?;
        E::rows_mut(&mut tables).push(row.clone());
        Ok(row)
    }

    async fn update(&self, current: &E, changes: &E::Update) -> Result<E, RepositoryError> {
        let mut tables = self.lock();
        let id = current.id();
        let mut row = E::rows(&tables)
            .iter()
            .find(|row| row.id() == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)?;

        row.apply(changes, Utc::now());
        E::check_integrity(&tables, &row)?;

        if let Some(slot) = E::rows_mut(&mut tables).iter_mut().find(|r| r.id() == id) {
            *slot = row.clone();
        }
        Ok(row)
    }

    async fn delete(&self, id: E::Id) -> Result<Option<E>, RepositoryError> {
        let mut tables = self.lock();
        let Some(position) = E::rows(&tables).iter().position(|row| row.id() == id) else {
            return Ok(None);
        };
        E::check_unreferenced(&tables, id)?;
        Ok(Some(E::rows_mut(&mut tables).remove(position)))
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn get_by_name(&self, name: &str) -> Result<Option<ProductCategory>, RepositoryError> {
        let tables = self.lock();
        Ok(tables
            .categories
            .iter()
            .find(|c| c.name.as_str() == name)
            .cloned())
    }

    async fn get_by_slug(&self, slug: &Slug) -> Result<Option<ProductCategory>, RepositoryError> {
        let tables = self.lock();
        Ok(tables.categories.iter().find(|c| &c.slug == slug).cloned())
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn get_by_name(&self, name: &str) -> Result<Option<ProductCollection>, RepositoryError> {
        let tables = self.lock();
        Ok(tables
            .collections
            .iter()
            .find(|c| c.name.as_str() == name)
            .cloned())
    }

    async fn get_by_slug(&self, slug: &Slug) -> Result<Option<ProductCollection>, RepositoryError> {
        let tables = self.lock();
        Ok(tables.collections.iter().find(|c| &c.slug == slug).cloned())
    }

    async fn find(
        &self,
        filter: &CollectionFilter,
        page: Page,
    ) -> Result<Vec<ProductCollection>, RepositoryError> {
        let tables = self.lock();
        let matching = tables.collections.iter().filter(|c| filter.matches(c));
        Ok(page.apply(matching).cloned().collect())
    }
}

impl MemoryTables {
    fn products_where(&self, page: Page, keep: impl Fn(&Product) -> bool) -> Vec<Product> {
        page.apply(self.products.iter().filter(|p| keep(p)))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn get_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError> {
        let tables = self.lock();
        Ok(tables
            .products
            .iter()
            .find(|p| p.name.as_str() == name)
            .cloned())
    }

    async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError> {
        let tables = self.lock();
        Ok(tables.products.iter().find(|p| &p.slug == slug).cloned())
    }

    async fn get_by_category_id(
        &self,
        category_id: CategoryId,
        page: Page,
    ) -> Result<Vec<Product>, RepositoryError> {
        let tables = self.lock();
        Ok(tables.products_where(page, |p| p.category_id == category_id))
    }

    async fn get_by_collection_id(
        &self,
        collection_id: CollectionId,
        page: Page,
    ) -> Result<Vec<Product>, RepositoryError> {
        let tables = self.lock();
        Ok(tables.products_where(page, |p| p.collection_id == Some(collection_id)))
    }

    async fn get_by_category_slug(
        &self,
        slug: &Slug,
        page: Page,
    ) -> Result<Vec<Product>, RepositoryError> {
        let tables = self.lock();
        let Some(category_id) = tables
            .categories
            .iter()
            .find(|c| &c.slug == slug)
            .map(|c| c.id)
        else {
            return Ok(Vec::new());
        };
        Ok(tables.products_where(page, |p| p.category_id == category_id))
    }

    async fn get_by_collection_slug(
        &self,
        slug: &Slug,
        page: Page,
    ) -> Result<Vec<Product>, RepositoryError> {
        let tables = self.lock();
        let Some(collection_id) = tables
            .collections
            .iter()
            .find(|c| &c.slug == slug)
            .map(|c| c.id)
        else {
            return Ok(Vec::new());
        };
        Ok(tables.products_where(page, |p| p.collection_id == Some(collection_id)))
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use inventory_core::{CatalogName, CategoryUpdate, ProductName, ProductUpdate};

    use super::*;

    fn new_category(name: &str) -> NewCategory {
        NewCategory {
            name: CatalogName::parse(name).unwrap(),
            slug: Slug::from_name(name).unwrap(),
            description: None,
            is_active: true,
        }
    }

    fn new_product(name: &str, category_id: CategoryId) -> NewProduct {
        NewProduct {
            name: ProductName::parse(name).unwrap(),
            slug: Slug::from_name(name).unwrap(),
            description: None,
            category_id,
            collection_id: None,
            is_active: true,
        }
    }

    async fn category(store: &MemoryStore, name: &str) -> ProductCategory {
        CrudStore::<ProductCategory>::create(store, &new_category(name))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let store = MemoryStore::new();
        let created = category(&store, "Lighting").await;

        assert_eq!(created.created_at, created.updated_at);
        let fetched = CrudStore::<ProductCategory>::get(&store, created.id)
            .await
            .unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let store = MemoryStore::new();
        category(&store, "Lighting").await;

        let mut duplicate = new_category("Lamps");
        duplicate.slug = Slug::parse("lighting").unwrap();
        let err = CrudStore::<ProductCategory>::create(&store, &duplicate)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(c) if c == "product_categories_slug_key"));
    }

    #[tokio::test]
    async fn test_product_requires_existing_category() {
        let store = MemoryStore::new();
        let err = CrudStore::<Product>::create(&store, &new_product("Lamp", CategoryId::generate()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(c) if c == "products_category_id_fkey"));
    }

    #[tokio::test]
    async fn test_delete_referenced_category_is_restricted() {
        let store = MemoryStore::new();
        let lighting = category(&store, "Lighting").await;
        let lamp = CrudStore::<Product>::create(&store, &new_product("Lamp", lighting.id))
            .await
            .unwrap();

        let err = CrudStore::<ProductCategory>::delete(&store, lighting.id)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        CrudStore::<Product>::delete(&store, lamp.id).await.unwrap();
        let deleted = CrudStore::<ProductCategory>::delete(&store, lighting.id)
            .await
            .unwrap();
        assert_eq!(deleted.map(|c| c.id), Some(lighting.id));
    }

    #[tokio::test]
    async fn test_update_writes_only_supplied_fields() {
        let store = MemoryStore::new();
        let lighting = category(&store, "Lighting").await;

        let changes = CategoryUpdate {
            description: Some(Some("Lamps and bulbs".to_string())),
            ..CategoryUpdate::default()
        };
        let updated = CrudStore::<ProductCategory>::update(&store, &lighting, &changes)
            .await
            .unwrap();

        assert_eq!(updated.name, lighting.name);
        assert_eq!(updated.description.as_deref(), Some("Lamps and bulbs"));
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn test_update_deleted_record_is_not_found() {
        let store = MemoryStore::new();
        let lighting = category(&store, "Lighting").await;
        CrudStore::<ProductCategory>::delete(&store, lighting.id)
            .await
            .unwrap();

        let err =
            CrudStore::<ProductCategory>::update(&store, &lighting, &CategoryUpdate::default())
                .await
                .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_update_to_unknown_collection_conflicts() {
        let store = MemoryStore::new();
        let lighting = category(&store, "Lighting").await;
        let lamp = CrudStore::<Product>::create(&store, &new_product("Lamp", lighting.id))
            .await
            .unwrap();

        let changes = ProductUpdate {
            collection_id: Some(Some(CollectionId::generate())),
            ..ProductUpdate::default()
        };
        let err = CrudStore::<Product>::update(&store, &lamp, &changes)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(c) if c == "products_collection_id_fkey"));
    }

    #[tokio::test]
    async fn test_products_by_parent_slug() {
        let store = MemoryStore::new();
        let lighting = category(&store, "Lighting").await;
        let seating = category(&store, "Seating").await;
        let summer = CrudStore::<ProductCollection>::create(
            &store,
            &NewCollection {
                name: CatalogName::parse("Summer").unwrap(),
                slug: Slug::parse("summer").unwrap(),
                description: None,
                is_active: true,
            },
        )
        .await
        .unwrap();

        let mut lamp = new_product("Lamp", lighting.id);
        lamp.collection_id = Some(summer.id);
        CrudStore::<Product>::create(&store, &lamp).await.unwrap();
        CrudStore::<Product>::create(&store, &new_product("Chair", seating.id))
            .await
            .unwrap();

        let page = Page::first(10);
        let lit = store
            .get_by_category_slug(&Slug::parse("lighting").unwrap(), page)
            .await
            .unwrap();
        assert_eq!(lit.len(), 1);
        assert_eq!(lit[0].name.as_str(), "Lamp");

        let in_summer = store
            .get_by_collection_slug(&Slug::parse("summer").unwrap(), page)
            .await
            .unwrap();
        assert_eq!(in_summer.len(), 1);

        let unknown = store
            .get_by_category_slug(&Slug::parse("nowhere").unwrap(), page)
            .await
            .unwrap();
        assert!(unknown.is_empty());
    }

    #[tokio::test]
    async fn test_get_multi_pages_in_insertion_order() {
        let store = MemoryStore::new();
        for name in ["Alpha", "Beta", "Gamma"] {
            category(&store, name).await;
        }

        let first: Vec<ProductCategory> = CrudStore::get_multi(&store, Page::first(2))
            .await
            .unwrap();
        let second: Vec<ProductCategory> = CrudStore::get_multi(&store, Page::first(2).next())
            .await
            .unwrap();

        let names: Vec<_> = first.iter().chain(&second).map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Alpha", "Beta", "Gamma"]);
    }
}
