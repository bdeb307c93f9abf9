//! Product categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CATALOG_SLUG_MAX_LENGTH, Entity, deserialize_some};
use crate::types::{CatalogName, CategoryId, Slug, SlugError};

/// A product category. Every product belongs to exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: CategoryId,
    pub name: CatalogName,
    pub slug: Slug,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for ProductCategory {
    type Id = CategoryId;
    type New = NewCategory;
    type Update = CategoryUpdate;

    const NAME: &'static str = "Category";

    fn id(&self) -> CategoryId {
        self.id
    }
}

/// Request body for creating a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: CatalogName,
    /// Derived from `name` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<Slug>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Defaults to `true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl CategoryCreate {
    /// Resolve defaults into an insertable category.
    ///
    /// # Errors
    ///
    /// Returns a [`SlugError`] if no slug was given and none can be derived
    /// from the name, or if the given slug is longer than
    /// [`CATALOG_SLUG_MAX_LENGTH`].
    pub fn into_new(self) -> Result<NewCategory, SlugError> {
        let slug = match self.slug {
            Some(slug) => slug,
            None => Slug::from_name(self.name.as_str())?,
        };
        slug.ensure_max_len(CATALOG_SLUG_MAX_LENGTH)?;

        Ok(NewCategory {
            name: self.name,
            slug,
            description: self.description,
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

/// A category ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: CatalogName,
    pub slug: Slug,
    pub description: Option<String>,
    pub is_active: bool,
}

/// Partial update for a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<CatalogName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<Slug>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl CategoryUpdate {
    /// Check constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::TooLong`] if the new slug is longer than
    /// [`CATALOG_SLUG_MAX_LENGTH`].
    pub fn validate(&self) -> Result<(), SlugError> {
        self.slug
            .as_ref()
            .map_or(Ok(()), |slug| slug.ensure_max_len(CATALOG_SLUG_MAX_LENGTH))
    }

    /// Returns `true` if no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.is_active.is_none()
    }

    /// Copy the supplied fields onto `category`.
    pub fn apply(&self, category: &mut ProductCategory) {
        if let Some(name) = &self.name {
            category.name = name.clone();
        }
        if let Some(slug) = &self.slug {
            category.slug = slug.clone();
        }
        if let Some(description) = &self.description {
            category.description.clone_from(description);
        }
        if let Some(is_active) = self.is_active {
            category.is_active = is_active;
        }
    }
}
