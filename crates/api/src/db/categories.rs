//! Category rows and lookups.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query_builder::Separated;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use inventory_core::{CatalogName, CategoryId, ProductCategory, Slug};

use super::RepositoryError;
use super::postgres::{PgEntity, PgStore};
use super::store::CategoryStore;

/// Shared by categories and collections, which have identical columns.
pub const CATALOG_COLUMNS: &str = "id, name, slug, description, is_active, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` category queries.
#[derive(Debug, sqlx::FromRow)]
pub struct CategoryRow {
    id: Uuid,
    name: String,
    slug: String,
    description: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CategoryRow> for ProductCategory {
    type Error = RepositoryError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        let name = CatalogName::parse(&row.name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid category name in database: {e}"))
        })?;
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid category slug in database: {e}"))
        })?;

        Ok(Self {
            id: CategoryId::new(row.id),
            name,
            slug,
            description: row.description,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PgEntity for ProductCategory {
    const TABLE: &'static str = "inventory.product_categories";
    const COLUMNS: &'static str = CATALOG_COLUMNS;

    type Row = CategoryRow;

    fn push_insert(query: &mut QueryBuilder<'_, Postgres>, new: &Self::New) {
        query.push("(name, slug, description, is_active) VALUES (");
        let mut values = query.separated(", ");
        values
            .push_bind(new.name.clone())
            .push_bind(new.slug.clone())
            .push_bind(new.description.clone())
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
        if let Some(is_active) = changes.is_active {
            set.push("is_active = ").push_bind_unseparated(is_active);
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

#[async_trait]
impl CategoryStore for PgStore {
    async fn get_by_name(&self, name: &str) -> Result<Option<ProductCategory>, RepositoryError> {
        self.find_by_text("name", name).await
    }

    async fn get_by_slug(&self, slug: &Slug) -> Result<Option<ProductCategory>, RepositoryError> {
        self.find_by_text("slug", slug.as_str()).await
    }
}
