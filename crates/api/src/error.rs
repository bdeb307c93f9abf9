//! Unified error handling for the API.
//!
//! Every error response has the body `{"detail": "<message>"}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::db::RepositoryError;
use crate::services::CatalogError;

/// Application-level error type for HTTP handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog operation failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Bearer token missing or rejected.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Resource not found outside the service layer (e.g. malformed slug in a path).
    #[error("{0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Path, query string or body could not be extracted.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(CatalogError::NotFound { .. }) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Catalog(
                CatalogError::AlreadyExists { .. }
                | CatalogError::InvalidReference { .. }
                | CatalogError::InvalidSlug(_),
            )
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Catalog(CatalogError::Repository(RepositoryError::Conflict(_))) => {
                StatusCode::CONFLICT
            }
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Catalog(CatalogError::Repository(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Rejected { status, .. } => *status,
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
        }

        // Don't expose internal error details to clients
        let detail = match &self {
            _ if status.is_server_error() => "Internal server error".to_string(),
            Self::Catalog(CatalogError::Repository(RepositoryError::Conflict(_))) => {
                "Request conflicts with a concurrent change; retry".to_string()
            }
            _ => self.to_string(),
        };

        let mut response = (status, Json(json!({ "detail": detail }))).into_response();
        if matches!(self, Self::Auth(_)) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::services::LookupKey;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_status_codes() {
        let not_found = AppError::from(CatalogError::NotFound {
            entity: "Product",
            key: LookupKey::Id(Uuid::nil()),
        });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let exists = AppError::from(CatalogError::AlreadyExists {
            entity: "Category",
            key: LookupKey::Name("Electronics".to_string()),
        });
        assert_eq!(exists.status(), StatusCode::BAD_REQUEST);

        let reference = AppError::from(CatalogError::InvalidReference {
            entity: "Category",
            id: Uuid::nil(),
        });
        assert_eq!(reference.status(), StatusCode::BAD_REQUEST);

        let conflict = AppError::from(CatalogError::Repository(RepositoryError::Conflict(
            "products_slug_key".to_string(),
        )));
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let corrupt = AppError::from(CatalogError::Repository(RepositoryError::DataCorruption(
            "bad slug".to_string(),
        )));
        assert_eq!(corrupt.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(
            AppError::from(AuthError::MissingCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::BadRequest("Limit cannot exceed 500 items.".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_auth_error_response() {
        let response = AppError::from(AuthError::MissingClaims).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
        assert_eq!(
            body_json(response).await,
            json!({"detail": "Invalid token payload"})
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let response = AppError::from(CatalogError::Repository(RepositoryError::DataCorruption(
            "invalid slug in row".to_string(),
        )))
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "Internal server error"})
        );
    }

    #[tokio::test]
    async fn test_catalog_message_is_detail() {
        let response = AppError::from(CatalogError::AlreadyExists {
            entity: "Category",
            key: LookupKey::Slug(inventory_core::Slug::parse("electronics").unwrap()),
        })
        .into_response();

        assert_eq!(
            body_json(response).await,
            json!({"detail": "Category with slug 'electronics' already exists"})
        );
    }
}
