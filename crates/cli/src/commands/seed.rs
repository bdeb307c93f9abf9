//! Seed the catalog from a YAML file.
//!
//! Records go through the service layer, so seeding applies the same
//! uniqueness and reference checks as the HTTP API. Records whose slug or
//! name is already taken are skipped, which makes re-running a seed file safe.
//!
//! # File Format
//!
//! ```yaml
//! categories:
//!   - name: Electronics
//!     slug: electronics
//! collections:
//!   - name: Summer Sale
//! products:
//!   - name: Laptop
//!     category: electronics
//!     collection: summer-sale
//! ```

use std::path::Path;
use std::sync::Arc;

use inventory_api::db::{PgStore, create_pool};
use inventory_api::services::{CatalogError, CategoryService, CollectionService, ProductService};
use inventory_core::{CategoryCreate, CollectionCreate, ProductCreate, ProductName, Slug};
use serde::Deserialize;
use tracing::{info, warn};

/// Parsed seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    #[serde(default)]
    pub categories: Vec<CategoryCreate>,
    #[serde(default)]
    pub collections: Vec<CollectionCreate>,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

/// A product whose parents are named by slug instead of id.
#[derive(Debug, Deserialize)]
pub struct ProductSeed {
    pub name: ProductName,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default)]
    pub description: Option<String>,
    pub category: Slug,
    #[serde(default)]
    pub collection: Option<Slug>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Counts reported after seeding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub skipped: usize,
}

impl SeedSummary {
    /// Fold one insert outcome into the summary, skipping records that already exist.
    fn record<T>(
        &mut self,
        label: &str,
        result: Result<T, CatalogError>,
    ) -> Result<(), CatalogError> {
        match result {
            Ok(_) => self.inserted += 1,
            Err(CatalogError::AlreadyExists { .. }) => {
                warn!(record = label, "Already exists, skipping");
                self.skipped += 1;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

/// Catalog services used by the seeder.
pub struct Seeder {
    pub categories: CategoryService,
    pub collections: CollectionService,
    pub products: ProductService,
}

impl Seeder {
    /// Insert categories, then collections, then products.
    ///
    /// # Errors
    ///
    /// Stops at the first failure other than an already-taken slug or name,
    /// including a product whose category or collection slug is unknown.
    pub async fn apply(&self, seed: SeedFile) -> Result<SeedSummary, CatalogError> {
        let mut summary = SeedSummary::default();

        for category in seed.categories {
            let label = category.name.to_string();
            summary.record(&label, self.categories.create(category).await)?;
        }
        for collection in seed.collections {
            let label = collection.name.to_string();
            summary.record(&label, self.collections.create(collection).await)?;
        }
        for product in seed.products {
            let label = product.name.to_string();
            let category = self.categories.get_by_slug(&product.category).await?;
            let collection = match &product.collection {
                Some(slug) => Some(self.collections.get_by_slug(slug).await?.id),
                None => None,
            };
            let input = ProductCreate {
                name: product.name,
                slug: product.slug,
                description: product.description,
                category_id: category.id,
                collection_id: collection,
                is_active: product.is_active,
            };
            summary.record(&label, self.products.create(input).await)?;
        }

        Ok(summary)
    }
}

/// Seed the database from `file_path`.
///
/// # Errors
///
/// Returns an error if the database URL is unset, the file cannot be read or
/// parsed, or a record is rejected.
pub async fn run(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url().ok_or("API_DATABASE_URL not set")?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed file");

    // Parse before connecting so a bad file fails fast
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    info!(
        categories = seed.categories.len(),
        collections = seed.collections.len(),
        products = seed.products.len(),
        "Parsed seed file"
    );

    let pool = create_pool(&database_url).await?;
    info!("Connected to database");

    let store = Arc::new(PgStore::new(pool));
    let seeder = Seeder {
        categories: CategoryService::new(store.clone()),
        collections: CollectionService::new(store.clone()),
        products: ProductService::new(store.clone(), store.clone(), store),
    };
    let summary = seeder.apply(seed).await?;

    info!("Seeding complete!");
    info!("  Records inserted: {}", summary.inserted);
    info!("  Records skipped (already exist): {}", summary.skipped);

    Ok(())
}
