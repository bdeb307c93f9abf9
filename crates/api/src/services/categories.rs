//! Category service.

use std::sync::Arc;

use inventory_core::{CategoryCreate, CategoryUpdate, Entity, Page, ProductCategory, Slug};
use tracing::{info, instrument};

use super::{CatalogError, LookupKey, ensure_unique, log_failure, update_error};
use crate::db::CategoryStore;

const ENTITY: &str = ProductCategory::NAME;

/// Category operations. Categories are addressed by slug.
#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn CategoryStore>,
}

impl CategoryService {
    /// Create a new category service.
    #[must_use]
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        Self { store }
    }

    /// List categories in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    pub async fn list(&self, page: Page) -> Result<Vec<ProductCategory>, CatalogError> {
        Ok(self.store.get_multi(page).await?)
    }

    /// Get a category by slug.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no category has this slug.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<ProductCategory, CatalogError> {
        self.store
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| CatalogError::not_found(ENTITY, LookupKey::Slug(slug.clone())))
    }

    /// Create a category after checking slug and name are free.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::AlreadyExists` if the slug or name is taken,
    /// `CatalogError::InvalidSlug` if no usable slug can be derived.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CategoryCreate) -> Result<ProductCategory, CatalogError> {
        let result = self.try_create(input).await;
        match &result {
            Ok(category) => {
                info!(category_id = %category.id, slug = %category.slug, "Category created");
            }
            Err(e) => log_failure("create category", e),
        }
        result
    }

    async fn try_create(&self, input: CategoryCreate) -> Result<ProductCategory, CatalogError> {
        let new = input.into_new()?;

        let existing = self.store.get_by_slug(&new.slug).await?;
        ensure_unique(existing.as_ref(), None, LookupKey::Slug(new.slug.clone()))?;

        let existing = self.store.get_by_name(new.name.as_str()).await?;
        ensure_unique(existing.as_ref(), None, LookupKey::Name(new.name.to_string()))?;

        Ok(self.store.create(&new).await?)
    }

    /// Apply a partial update to the category at `slug`.
    ///
    /// A changed slug or name is re-checked against other categories; keeping
    /// the current value is always allowed.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no category has `slug`, and
    /// `CatalogError::AlreadyExists` if the new slug or name is taken.
    #[instrument(skip(self, changes), fields(slug = %slug))]
    pub async fn update(
        &self,
        slug: &Slug,
        changes: CategoryUpdate,
    ) -> Result<ProductCategory, CatalogError> {
        let result = self.try_update(slug, &changes).await;
        match &result {
            Ok(category) => info!(category_id = %category.id, "Category updated"),
            Err(e) => log_failure("update category", e),
        }
        result
    }

    async fn try_update(
        &self,
        slug: &Slug,
        changes: &CategoryUpdate,
    ) -> Result<ProductCategory, CatalogError> {
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
            .map_err(update_error::<ProductCategory>(LookupKey::Slug(slug.clone())))
    }

    /// Delete the category at `slug`, returning it.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no category has `slug`, and
    /// `CatalogError::Repository` with a conflict if products still belong to it.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn delete(&self, slug: &Slug) -> Result<ProductCategory, CatalogError> {
        let result = self.try_delete(slug).await;
        match &result {
            Ok(category) => info!(category_id = %category.id, "Category deleted"),
            Err(e) => log_failure("delete category", e),
        }
        result
    }

    async fn try_delete(&self, slug: &Slug) -> Result<ProductCategory, CatalogError> {
        let current = self.get_by_slug(slug).await?;
        self.store
            .delete(current.id)
            .await?
            .ok_or_else(|| CatalogError::not_found(ENTITY, LookupKey::Slug(slug.clone())))
    }
}
