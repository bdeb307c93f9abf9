//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                                   - Service banner (public)
//! GET    /health                             - Liveness (public)
//! GET    /health/ready                       - Store readiness (public)
//!
//! # Auth (under /api/v1)
//! GET    /auth/me                            - Caller identity
//! GET    /auth/protected                     - Required-auth demo
//! GET    /auth/optional                      - Optional-auth demo
//!
//! # Products
//! GET    /products/                          - List (skip, limit)
//! POST   /products/                          - Create
//! GET    /products/{product_id}              - Detail
//! PUT    /products/{product_id}              - Partial update
//! DELETE /products/{product_id}              - Delete
//! GET    /products/slug/{slug}               - Detail by slug
//! GET    /products/category/{category_id}    - By category id
//! GET    /products/category/slug/{slug}      - By category slug
//! GET    /products/collection/{collection_id} - By collection id
//! GET    /products/collection/slug/{slug}    - By collection slug
//!
//! # Categories
//! GET    /categories/                        - List
//! POST   /categories/                        - Create
//! GET    /categories/{slug}                  - Detail
//! PUT    /categories/{slug}                  - Partial update
//! DELETE /categories/{slug}                  - Delete
//!
//! # Collections
//! GET    /collections/                       - List (skip, limit, active, q)
//! POST   /collections/                       - Create
//! GET    /collections/{slug}                 - Detail
//! PUT    /collections/{slug}                 - Partial update
//! DELETE /collections/{slug}                 - Delete
//! POST   /collections/{slug}/activate        - Mark active
//! POST   /collections/{slug}/deactivate      - Mark inactive
//! ```
//!
//! Collection roots answer both with and without the trailing slash.

pub mod auth;
pub mod categories;
pub mod collections;
pub mod health;
pub mod pagination;
pub mod products;

use axum::{
    Router,
    http::{HeaderValue, Request, Response},
    routing::{get, post},
};
use inventory_core::Slug;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

pub use pagination::PageQuery;

use crate::config::API_PREFIX;
use crate::error::AppError;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Parse a slug path segment.
///
/// A segment that could never be a stored slug cannot name a record, so it is
/// reported as not found rather than as a bad request.
pub(crate) fn slug_param(raw: &str, entity: &'static str) -> Result<Slug, AppError> {
    Slug::parse(raw)
        .map_err(|_| AppError::NotFound(format!("{entity} with slug '{raw}' not found")))
}

/// Create the auth demo routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(auth::me))
        .route("/protected", get(auth::protected))
        .route("/optional", get(auth::optional))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    let root = get(products::index).post(products::create);
    Router::new()
        .route("/products", root.clone())
        .route("/products/", root)
        .route(
            "/products/{product_id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
        .route("/products/slug/{slug}", get(products::show_by_slug))
        .route("/products/category/{category_id}", get(products::by_category))
        .route(
            "/products/category/slug/{slug}",
            get(products::by_category_slug),
        )
        .route(
            "/products/collection/{collection_id}",
            get(products::by_collection),
        )
        .route(
            "/products/collection/slug/{slug}",
            get(products::by_collection_slug),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    let root = get(categories::index).post(categories::create);
    Router::new()
        .route("/categories", root.clone())
        .route("/categories/", root)
        .route(
            "/categories/{slug}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::destroy),
        )
}

/// Create the collection routes router.
pub fn collection_routes() -> Router<AppState> {
    let root = get(collections::index).post(collections::create);
    Router::new()
        .route("/collections", root.clone())
        .route("/collections/", root)
        .route(
            "/collections/{slug}",
            get(collections::show)
                .put(collections::update)
                .delete(collections::destroy),
        )
        .route("/collections/{slug}/activate", post(collections::activate))
        .route(
            "/collections/{slug}/deactivate",
            post(collections::deactivate),
        )
}

/// Create all versioned API routes (mounted under [`API_PREFIX`]).
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .merge(product_routes())
        .merge(category_routes())
        .merge(collection_routes())
}

/// Build the CORS layer from configured origins.
///
/// Credentials are allowed, so methods and headers mirror the request instead
/// of using wildcards.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Build the complete application with middleware layers.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors_origins);

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest(API_PREFIX, api_routes())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: std::time::Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(cors)
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{StatusCode, header};
    use inventory_core::Email;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::issue_token;
    use crate::config::ApiConfig;
    use crate::db::MemoryStore;

    fn test_app() -> (Router, String) {
        let config = ApiConfig::from_lookup(|key| match key {
            "API_DATABASE_URL" => Some("postgres://localhost/inventory".to_string()),
            "API_JWT_SECRET" => Some("q8Zr3vN1xK7pL0sT5wY2bE9mC4hJ6aDgF".to_string()),
            _ => None,
        })
        .unwrap();
        let email = Email::parse("ada@example.com").unwrap();
        let token = issue_token(
            &config.jwt,
            "user-1",
            &email,
            Some("authenticated"),
            chrono::Duration::minutes(5),
        )
        .unwrap();
        let state = AppState::new(config, Arc::new(MemoryStore::new()));
        (app(state), token)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_public_routes() {
        let (app, _) = test_app();

        let (status, body) = send(app.clone(), get("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = send(app, get("/", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["api"], "/api/v1");
    }

    #[tokio::test]
    async fn test_listing_requires_token() {
        let (app, _) = test_app();
        let (status, body) = send(app, get("/api/v1/products/", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"detail": "Not authenticated"}));
    }

    #[tokio::test]
    async fn test_collection_roots_with_and_without_slash() {
        let (app, token) = test_app();
        for uri in ["/api/v1/categories", "/api/v1/categories/"] {
            let (status, body) = send(app.clone(), get(uri, Some(&token))).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body, json!([]));
        }
    }

    #[tokio::test]
    async fn test_limit_above_ceiling() {
        let (app, token) = test_app();
        let request = get("/api/v1/products/?limit=501", Some(&token));
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"detail": "Limit cannot exceed 500 items."}));
    }

    #[tokio::test]
    async fn test_malformed_slug_is_not_found() {
        let (app, token) = test_app();
        let request = get("/api/v1/categories/Not%20A%20Slug", Some(&token));
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"detail": "Category with slug 'Not A Slug' not found"})
        );
    }

    #[tokio::test]
    async fn test_request_id_echoed() {
        let (app, _) = test_app();
        let request = Request::builder()
            .uri("/health")
            .header("x-request-id", "req-42")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");
    }

    #[tokio::test]
    async fn test_extractor_rejections_are_json() {
        let (app, token) = test_app();

        let (status, body) = send(
            app.clone(),
            get("/api/v1/products/not-a-uuid", Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("product_id"));

        let (status, body) = send(
            app.clone(),
            get("/api/v1/products/?limit=many", Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/categories/")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"slug": "no-name"}"#))
            .unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("name"));
    }
}
