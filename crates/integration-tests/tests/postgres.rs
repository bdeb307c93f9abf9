//! `PgStore` tests against a real database.
//!
//! These tests require a reachable `PostgreSQL` at `DATABASE_URL`. Migrations
//! are applied on connect. Every test writes records under a unique suffix so
//! runs never collide.
//!
//! Run with: cargo test -p inventory-integration-tests --test postgres -- --ignored

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use inventory_api::db::{
    CategoryStore, CrudStore, MIGRATOR, PgStore, RepositoryError, StoreHealth, create_pool,
};
use inventory_api::services::{CatalogError, CategoryService, CollectionService, ProductService};
use inventory_core::{
    CatalogName, CategoryCreate, CategoryUpdate, CollectionCreate, NewCategory, Page,
    ProductCategory, ProductCreate, ProductName, Slug,
};
use secrecy::SecretString;
use uuid::Uuid;

async fn store() -> Arc<PgStore> {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = create_pool(&SecretString::from(url)).await.unwrap();
    MIGRATOR.run(&pool).await.unwrap();
    Arc::new(PgStore::new(pool))
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

fn category_input(name: &str) -> CategoryCreate {
    CategoryCreate {
        name: CatalogName::parse(name).unwrap(),
        slug: None,
        description: None,
        is_active: None,
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_ping() {
    let store = store().await;
    store.ping().await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_category_lifecycle() {
    let store = store().await;
    let service = CategoryService::new(store.clone());
    let name = unique("lifecycle");

    let created = service.create(category_input(&name)).await.unwrap();
    assert_eq!(created.slug.as_str(), name);

    let changes = CategoryUpdate {
        description: Some(Some("Updated".to_string())),
        ..CategoryUpdate::default()
    };
    let updated = service.update(&created.slug, changes).await.unwrap();
    assert_eq!(updated.description.as_deref(), Some("Updated"));
    assert_eq!(updated.slug, created.slug);
    assert!(updated.updated_at >= created.updated_at);

    let by_name = CategoryStore::get_by_name(store.as_ref(), &name).await.unwrap();
    assert_eq!(by_name.map(|c| c.id), Some(created.id));

    service.delete(&created.slug).await.unwrap();
    let err = service.get_by_slug(&created.slug).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_unique_constraint_backstop() {
    let store = store().await;
    let service = CategoryService::new(store.clone());
    let name = unique("backstop");
    let created = service.create(category_input(&name)).await.unwrap();

    // Insert straight into the store, skipping the service's uniqueness check.
    let racing = NewCategory {
        name: CatalogName::parse(&unique("other")).unwrap(),
        slug: created.slug.clone(),
        description: None,
        is_active: true,
    };
    let err = CrudStore::<ProductCategory>::create(store.as_ref(), &racing)
        .await
        .unwrap_err();
    assert!(
        matches!(err, RepositoryError::Conflict(ref c) if c == "product_categories_slug_key"),
        "{err:?}"
    );

    service.delete(&created.slug).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_products_by_parent_and_restricted_delete() {
    let store = store().await;
    let categories = CategoryService::new(store.clone());
    let collections = CollectionService::new(store.clone());
    let products = ProductService::new(store.clone(), store.clone(), store.clone());

    let category = categories.create(category_input(&unique("cat"))).await.unwrap();
    let collection = collections
        .create(CollectionCreate {
            name: CatalogName::parse(&unique("col")).unwrap(),
            slug: None,
            description: None,
            is_active: None,
        })
        .await
        .unwrap();

    let product = products
        .create(ProductCreate {
            name: ProductName::parse("Laptop").unwrap(),
            slug: Some(Slug::parse(&unique("laptop")).unwrap()),
            description: None,
            category_id: category.id,
            collection_id: Some(collection.id),
            is_active: None,
        })
        .await
        .unwrap();

    let by_category = products
        .list_by_category_slug(&category.slug, Page::first(10))
        .await
        .unwrap();
    assert_eq!(by_category.iter().map(|p| p.id).collect::<Vec<_>>(), [product.id]);

    let by_collection = products
        .list_by_collection_id(collection.id, Page::first(10))
        .await
        .unwrap();
    assert_eq!(by_collection.len(), 1);

    let err = categories.delete(&category.slug).await.unwrap_err();
    assert!(matches!(err, CatalogError::Repository(RepositoryError::Conflict(_))));

    products.delete(product.id).await.unwrap();
    collections.delete(&collection.slug).await.unwrap();
    categories.delete(&category.slug).await.unwrap();
}
