//! Catalog entities and their create/update payloads.
//!
//! Each entity comes with three shapes:
//!
//! - the persisted record (`Product`, `ProductCategory`, `ProductCollection`)
//! - a create payload as received over HTTP, where `slug` may be omitted
//! - a resolved `New*` value handed to storage, with every column decided
//!
//! Update payloads are partial: an absent field is left untouched. Nullable
//! columns use `Option<Option<T>>` so that `null` clears the value while an
//! absent key keeps it.

pub mod category;
pub mod collection;
pub mod product;

use core::fmt::{Debug, Display};
use core::hash::Hash;

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

pub use category::{CategoryCreate, CategoryUpdate, NewCategory, ProductCategory};
pub use collection::{CollectionCreate, CollectionUpdate, NewCollection, ProductCollection};
pub use product::{NewProduct, Product, ProductCreate, ProductUpdate};

/// Longest slug accepted for categories and collections.
///
/// Product slugs use the full [`Slug::MAX_LENGTH`](crate::Slug::MAX_LENGTH).
pub const CATALOG_SLUG_MAX_LENGTH: usize = 100;

/// A persisted catalog record.
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    /// Primary key type.
    type Id: Copy + Eq + Hash + Debug + Display + Into<Uuid> + Send + Sync + 'static;
    /// Fully resolved insert payload.
    type New: Debug + Send + Sync;
    /// Partial update payload.
    type Update: Debug + Send + Sync;

    /// Human-readable entity name used in messages.
    const NAME: &'static str;

    /// The record's primary key.
    fn id(&self) -> Self::Id;
}

/// Deserialize a present field as `Some`, including an explicit `null`.
///
/// Paired with `#[serde(default)]`, an absent key becomes `None` and a `null`
/// becomes `Some(None)`.
fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
