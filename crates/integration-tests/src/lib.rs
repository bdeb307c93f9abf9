//! Integration tests for the inventory API.
//!
//! # Running Tests
//!
//! ```bash
//! # HTTP tests (in-memory store, no services needed)
//! cargo test -p inventory-integration-tests
//!
//! # Include the PostgreSQL adapter tests
//! DATABASE_URL=postgres://localhost/inventory_test \
//!     cargo test -p inventory-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `auth` - Required and optional bearer authentication
//! - `categories`, `collections`, `products` - Catalog endpoints
//! - `postgres` - `PgStore` against a real database (ignored by default)

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Duration;
use inventory_api::auth::issue_token;
use inventory_api::config::ApiConfig;
use inventory_api::db::MemoryStore;
use inventory_api::state::AppState;
use inventory_core::Email;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

/// Secret shared by the test server and the tokens minted for it.
pub const TEST_JWT_SECRET: &str = "q8Zr3vN1xK7pL0sT5wY2bE9mC4hJ6aDgF";

/// Build a configuration for tests without touching the process environment.
///
/// # Panics
///
/// Panics if the fixed test values fail validation.
#[must_use]
pub fn test_config() -> ApiConfig {
    ApiConfig::from_lookup(|key| match key {
        "API_DATABASE_URL" => Some("postgres://localhost/inventory_test".to_string()),
        "API_JWT_SECRET" => Some(TEST_JWT_SECRET.to_string()),
        "API_MAX_PAGE_LIMIT" => Some("50".to_string()),
        "API_DEFAULT_PAGE_LIMIT" => Some("20".to_string()),
        _ => None,
    })
    .expect("test configuration is valid")
}

/// A running API server backed by a fresh in-memory store.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    config: ApiConfig,
}

impl TestServer {
    /// Serve the router on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        let config = test_config();
        let state = AppState::new(config.clone(), Arc::new(MemoryStore::new()));
        let app = inventory_api::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has an address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        Self {
            addr,
            client: Client::new(),
            config,
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Mint a token for `email` valid for one hour.
    ///
    /// # Panics
    ///
    /// Panics if `email` is not a valid address.
    #[must_use]
    pub fn token(&self, email: &str) -> String {
        self.token_with_ttl(email, Duration::hours(1))
    }

    /// Mint a token with an explicit lifetime (negative for an expired token).
    ///
    /// # Panics
    ///
    /// Panics if `email` is not a valid address.
    #[must_use]
    pub fn token_with_ttl(&self, email: &str, ttl: Duration) -> String {
        let email = Email::parse(email).expect("valid test email");
        issue_token(&self.config.jwt, "user-123", &email, Some("authenticated"), ttl)
            .expect("token signs")
    }

    /// Start a request to `path` carrying a valid bearer token.
    #[must_use]
    pub fn authed(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .bearer_auth(self.token("tester@example.com"))
    }
}

/// Read a response as `(status, json body)`; an empty body reads as `null`.
///
/// # Panics
///
/// Panics if the body is not valid JSON.
pub async fn read(response: Response) -> (u16, Value) {
    let status = response.status().as_u16();
    let bytes = response.bytes().await.expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Body is JSON")
    };
    (status, body)
}
