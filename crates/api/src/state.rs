//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::config::{ApiConfig, PaginationConfig};
use crate::db::{CatalogStore, StoreHealth};
use crate::services::{CategoryService, CollectionService, ProductService};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Services are built once here and handed to
/// handlers; nothing is held in globals.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    verifier: TokenVerifier,
    categories: CategoryService,
    collections: CollectionService,
    products: ProductService,
    health: Arc<dyn StoreHealth>,
}

impl AppState {
    /// Create a new application state over one catalog backend.
    #[must_use]
    pub fn new<S: CatalogStore + 'static>(config: ApiConfig, store: Arc<S>) -> Self {
        let verifier = TokenVerifier::new(&config.jwt);
        let categories = CategoryService::new(store.clone());
        let collections = CollectionService::new(store.clone());
        let products = ProductService::new(store.clone(), store.clone(), store.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                verifier,
                categories,
                collections,
                products,
                health: store,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Pagination limits for list endpoints.
    #[must_use]
    pub fn pagination(&self) -> PaginationConfig {
        self.inner.config.pagination
    }

    /// Get a reference to the bearer token verifier.
    #[must_use]
    pub fn verifier(&self) -> &TokenVerifier {
        &self.inner.verifier
    }

    #[must_use]
    pub fn categories(&self) -> &CategoryService {
        &self.inner.categories
    }

    #[must_use]
    pub fn collections(&self) -> &CollectionService {
        &self.inner.collections
    }

    #[must_use]
    pub fn products(&self) -> &ProductService {
        &self.inner.products
    }

    /// Backend liveness probe for `/health/ready`.
    #[must_use]
    pub fn health(&self) -> &dyn StoreHealth {
        self.inner.health.as_ref()
    }
}
