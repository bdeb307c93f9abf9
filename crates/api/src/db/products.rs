//! Product rows and lookups.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query_builder::Separated;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use inventory_core::{
    CategoryId, CollectionId, Page, Product, ProductCategory, ProductCollection, ProductId,
    ProductName, Slug,
};

use super::RepositoryError;
use super::postgres::{PgEntity, PgStore};
use super::store::ProductStore;

const PRODUCT_COLUMNS: &str =
    "id, name, slug, description, category_id, collection_id, is_active, created_at, updated_at";

/// `PRODUCT_COLUMNS` qualified with the `p` alias, for joins.
const JOINED_PRODUCT_COLUMNS: &str = "p.id, p.name, p.slug, p.description, p.category_id, \
     p.collection_id, p.is_active, p.created_at, p.updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
pub struct ProductRow {
    id: Uuid,
    name: String,
    slug: String,
    description: Option<String>,
    category_id: Uuid,
    collection_id: Option<Uuid>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let name = ProductName::parse(&row.name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid product name in database: {e}"))
        })?;
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid product slug in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name,
            slug,
            description: row.description,
            category_id: CategoryId::new(row.category_id),
            collection_id: row.collection_id.map(CollectionId::new),
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PgEntity for Product {
    const TABLE: &'static str = "inventory.products";
    const COLUMNS: &'static str = PRODUCT_COLUMNS;

    type Row = ProductRow;

    fn push_insert(query: &mut QueryBuilder<'_, Postgres>, new: &Self::New) {
        query.push(
            "(name, slug, description, category_id, collection_id, is_active) VALUES (",
        );
        let mut values = query.separated(", ");
        values
            .push_bind(new.name.clone())
            .push_bind(new.slug.clone())
            .push_bind(new.description.clone())
            .push_bind(new.category_id)
            .push_bind(new.collection_id)
            .push_bind(new.is_active)
            .push_unseparated(")");
    }

    fn push_assignments(
        set: &mut Separated<'_, '_, Postgres, &'static str>,
        changes: &Self::Update,
    ) {
        if let Some(name) = &changes.name {
            set.push("name = ").push_bind_unseparated(name.clone());
        }
        if let Some(slug) = &changes.slug {
            set.push("slug = ").push_bind_unseparated(slug.clone());
        }
        if let Some(description) = &changes.description {
            set.push("description = ")
                .push_bind_unseparated(description.clone());
        }
        if let Some(category_id) = changes.category_id {
            set.push("category_id = ").push_bind_unseparated(category_id);
        }
        if let Some(collection_id) = changes.collection_id {
            set.push("collection_id = ")
                .push_bind_unseparated(collection_id);
        }
        if let Some(is_active) = changes.is_active {
            set.push("is_active = ").push_bind_unseparated(is_active);
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

impl PgStore {
    /// Products joined to a parent table, filtered on the parent's slug.
    async fn products_by_parent_slug(
        &self,
        parent_table: &str,
        foreign_key: &str,
        slug: &Slug,
        page: Page,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut query = QueryBuilder::new(format!(
            "SELECT {JOINED_PRODUCT_COLUMNS} FROM {} p \
             JOIN {parent_table} parent ON parent.id = p.{foreign_key} \
             WHERE parent.slug = ",
            <Product as PgEntity>::TABLE,
        ));
        query.push_bind(slug.as_str().to_owned());

        self.fetch_page(query, "p.", page).await
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn get_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError> {
        self.find_by_text("name", name).await
    }

    async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError> {
        self.find_by_text("slug", slug.as_str()).await
    }

    async fn get_by_category_id(
        &self,
        category_id: CategoryId,
        page: Page,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut query = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM {} WHERE category_id = ",
            <Product as PgEntity>::TABLE
        ));
        query.push_bind(category_id);

        self.fetch_page(query, "", page).await
    }

    async fn get_by_collection_id(
        &self,
        collection_id: CollectionId,
        page: Page,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut query = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM {} WHERE collection_id = ",
            <Product as PgEntity>::TABLE
        ));
        query.push_bind(collection_id);

        self.fetch_page(query, "", page).await
    }

    async fn get_by_category_slug(
        &self,
        slug: &Slug,
        page: Page,
    ) -> Result<Vec<Product>, RepositoryError> {
        self.products_by_parent_slug(
            <ProductCategory as PgEntity>::TABLE,
            "category_id",
            slug,
            page,
        )
        .await
    }

    async fn get_by_collection_slug(
        &self,
        slug: &Slug,
        page: Page,
    ) -> Result<Vec<Product>, RepositoryError> {
        self.products_by_parent_slug(
            <ProductCollection as PgEntity>::TABLE,
            "collection_id",
            slug,
            page,
        )
        .await
    }
}
