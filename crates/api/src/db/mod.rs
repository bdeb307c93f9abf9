//! Catalog persistence.
//!
//! # Schema: `inventory`
//!
//! ## Tables
//!
//! - `product_categories` - Categories (unique name and slug)
//! - `product_collections` - Collections (unique name and slug)
//! - `products` - Products (unique slug, FK to category, optional FK to collection)
//!
//! # Storage seams
//!
//! Services talk to the traits in [`store`]. [`PgStore`] backs them with
//! `PostgreSQL`; `MemoryStore` (tests and the `test-support` feature) keeps
//! everything in process while enforcing the same unique and foreign-key
//! constraints.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/`, embedded as [`MIGRATOR`],
//! and run via:
//! ```bash
//! cargo run -p inventory-cli -- migrate
//! ```

mod categories;
mod collections;
#[cfg(any(test, feature = "test-support"))]
mod memory;
mod postgres;
mod products;
pub mod store;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{
    CatalogStore, CategoryStore, CollectionFilter, CollectionStore, CrudStore, ProductStore,
    StoreHealth,
};

/// Embedded migrations for the `inventory` schema.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The record to update disappeared between lookup and write.
    #[error("not found")]
    NotFound,

    /// Constraint violation (unique name/slug, or a dangling/blocking foreign key).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Classify a write failure, surfacing integrity violations as `Conflict`.
    pub(crate) fn from_write(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
        {
            let detail = db_err
                .constraint()
                .map_or_else(|| db_err.message().to_string(), String::from);
            return Self::Conflict(detail);
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
