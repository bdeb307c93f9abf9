//! Catalog service error types.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use inventory_core::{Slug, SlugError};

use crate::db::RepositoryError;

/// How a record was looked up, for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    Id(Uuid),
    Slug(Slug),
    Name(String),
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "ID {id}"),
            Self::Slug(slug) => write!(f, "slug '{slug}'"),
            Self::Name(name) => write!(f, "name '{name}'"),
        }
    }
}

/// Errors that can occur during catalog operations.
///
/// The variant, not the message, decides the HTTP status.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The addressed record does not exist.
    #[error("{entity} with {key} not found")]
    NotFound {
        entity: &'static str,
        key: LookupKey,
    },

    /// Another record already holds this unique name or slug.
    #[error("{entity} with {key} already exists")]
    AlreadyExists {
        entity: &'static str,
        key: LookupKey,
    },

    /// A referenced category or collection does not exist.
    #[error("{entity} with ID '{id}' does not exist")]
    InvalidReference { entity: &'static str, id: Uuid },

    /// A slug could not be derived or exceeds the column width.
    #[error("invalid slug: {0}")]
    InvalidSlug(#[from] SlugError),

    /// Repository/database error, including constraint violations that raced
    /// past the checks above.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl CatalogError {
    pub(crate) fn not_found(entity: &'static str, key: LookupKey) -> Self {
        Self::NotFound { entity, key }
    }

    /// Whether the caller is at fault (as opposed to the backend).
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        !matches!(self, Self::Repository(_))
    }
}
