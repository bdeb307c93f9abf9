//! Products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, deserialize_some};
use crate::types::{CategoryId, CollectionId, ProductId, ProductName, Slug, SlugError};

/// A sellable product.
///
/// `category_id` always references an existing category; `collection_id`,
/// when set, references an existing collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: ProductName,
    pub slug: Slug,
    pub description: Option<String>,
    pub category_id: CategoryId,
    pub collection_id: Option<CollectionId>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Product {
    type Id = ProductId;
    type New = NewProduct;
    type Update = ProductUpdate;

    const NAME: &'static str = "Product";

    fn id(&self) -> ProductId {
        self.id
    }
}

/// Request body for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: ProductName,
    /// Derived from `name` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<Slug>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category_id: CategoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<CollectionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl ProductCreate {
    /// Resolve defaults into an insertable product.
    ///
    /// # Errors
    ///
    /// Returns a [`SlugError`] if no slug was given and none can be derived
    /// from the name.
    pub fn into_new(self) -> Result<NewProduct, SlugError> {
        let slug = match self.slug {
            Some(slug) => slug,
            None => Slug::from_name(self.name.as_str())?,
        };

        Ok(NewProduct {
            name: self.name,
            slug,
            description: self.description,
            category_id: self.category_id,
            collection_id: self.collection_id,
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

/// A product ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: ProductName,
    pub slug: Slug,
    pub description: Option<String>,
    pub category_id: CategoryId,
    pub collection_id: Option<CollectionId>,
    pub is_active: bool,
}

/// Partial update for a product.
///
/// `collection_id: null` detaches the product from its collection;
/// `category_id` can be changed but never cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<ProductName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<Slug>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub collection_id: Option<Option<CollectionId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl ProductUpdate {
    /// Returns `true` if no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
            && self.collection_id.is_none()
            && self.is_active.is_none()
    }

    /// Copy the supplied fields onto `product`.
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(slug) = &self.slug {
            product.slug = slug.clone();
        }
        if let Some(description) = &self.description {
            product.description.clone_from(description);
        }
        if let Some(category_id) = self.category_id {
            product.category_id = category_id;
        }
        if let Some(collection_id) = self.collection_id {
            product.collection_id = collection_id;
        }
        if let Some(is_active) = self.is_active {
            product.is_active = is_active;
        }
    }
}
