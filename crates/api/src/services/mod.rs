//! Business logic for the catalog.
//!
//! # Services
//!
//! - [`CategoryService`] - categories, addressed by slug
//! - [`CollectionService`] - collections, addressed by slug
//! - [`ProductService`] - products, addressed by id
//!
//! Services check uniqueness and referenced records before writing. The
//! checks are not atomic with the write: two concurrent creates can both
//! pass, and the loser fails on the store's unique constraint with
//! [`RepositoryError::Conflict`](crate::db::RepositoryError::Conflict)
//! instead of [`CatalogError::AlreadyExists`].

mod categories;
mod collections;
mod error;
mod products;

pub use categories::CategoryService;
pub use collections::CollectionService;
pub use error::{CatalogError, LookupKey};
pub use products::ProductService;

use inventory_core::Entity;

use crate::db::RepositoryError;

/// Fail if `existing` is a record other than `current`.
fn ensure_unique<E: Entity>(
    existing: Option<&E>,
    current: Option<E::Id>,
    key: LookupKey,
) -> Result<(), CatalogError> {
    match existing {
        Some(other) if Some(other.id()) != current => Err(CatalogError::AlreadyExists {
            entity: E::NAME,
            key,
        }),
        _ => Ok(()),
    }
}

/// Map a store error from an update, where `NotFound` means the record was
/// deleted after it was looked up.
fn update_error<E: Entity>(key: LookupKey) -> impl FnOnce(RepositoryError) -> CatalogError {
    move |e| match e {
        RepositoryError::NotFound => CatalogError::not_found(E::NAME, key),
        other => CatalogError::Repository(other),
    }
}

/// Log a failed mutation at a level matching whose fault it is.
fn log_failure(operation: &str, error: &CatalogError) {
    if error.is_rejection() {
        tracing::warn!(operation, error = %error, "Catalog request rejected");
    } else {
        tracing::error!(operation, error = %error, "Catalog operation failed");
    }
}
