//! Collection rows and lookups.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query_builder::Separated;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use inventory_core::{CatalogName, CollectionId, Page, ProductCollection, Slug};

use super::RepositoryError;
use super::categories::CATALOG_COLUMNS;
use super::postgres::{PgEntity, PgStore};
use super::store::{CollectionFilter, CollectionStore};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` collection queries.
#[derive(Debug, sqlx::FromRow)]
pub struct CollectionRow {
    id: Uuid,
    name: String,
    slug: String,
    description: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CollectionRow> for ProductCollection {
    type Error = RepositoryError;

    fn try_from(row: CollectionRow) -> Result<Self, Self::Error> {
        let name = CatalogName::parse(&row.name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid collection name in database: {e}"))
        })?;
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid collection slug in database: {e}"))
        })?;

        Ok(Self {
            id: CollectionId::new(row.id),
            name,
            slug,
            description: row.description,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PgEntity for ProductCollection {
    const TABLE: &'static str = "inventory.product_collections";
    const COLUMNS: &'static str = CATALOG_COLUMNS;

    type Row = CollectionRow;

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

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// =============================================================================
// Repository
// =============================================================================

#[async_trait]
impl CollectionStore for PgStore {
    async fn get_by_name(&self, name: &str) -> Result<Option<ProductCollection>, RepositoryError> {
        self.find_by_text("name", name).await
    }

    async fn get_by_slug(&self, slug: &Slug) -> Result<Option<ProductCollection>, RepositoryError> {
        self.find_by_text("slug", slug.as_str()).await
    }

    async fn find(
        &self,
        filter: &CollectionFilter,
        page: Page,
    ) -> Result<Vec<ProductCollection>, RepositoryError> {
        let mut query = QueryBuilder::new(format!(
            "SELECT {} FROM {} WHERE TRUE",
            CATALOG_COLUMNS,
            <ProductCollection as PgEntity>::TABLE
        ));
        if let Some(active) = filter.active {
            query.push(" AND is_active = ").push_bind(active);
        }
        if let Some(needle) = &filter.name_contains {
            query
                .push(" AND name ILIKE ")
                .push_bind(format!("%{}%", escape_like(needle)));
        }

        self.fetch_page(query, "", page).await
    }
}
