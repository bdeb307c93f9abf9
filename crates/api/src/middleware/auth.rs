//! Authentication extractors.
//!
//! Provides extractors for requiring or optionally reading the bearer token
//! caller in route handlers.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::auth::{AuthError, AuthenticatedUser};
use crate::error::AppError;
use crate::state::AppState;

/// Extract the credential from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively. Any other scheme counts as no
/// credential.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Set the Sentry user context for the current request.
fn set_sentry_user(user: &AuthenticatedUser) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user.user_id.clone()),
            email: Some(user.email.to_string()),
            ..Default::default()
        }));
    });
}

/// Extractor that requires a valid bearer token.
///
/// Rejects with `401 Unauthorized` and `WWW-Authenticate: Bearer` when the
/// header is missing, the token fails verification, or the claims lack
/// `sub`/`email`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let result = bearer_token(parts)
            .ok_or(AuthError::MissingCredentials)
            .and_then(|token| state.verifier().verify(token));

        match result {
            Ok(user) => {
                set_sentry_user(&user);
                Ok(Self(user))
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %parts.uri.path(), "Rejected request credentials");
                Err(e.into())
            }
        }
    }
}

/// Extractor that optionally reads the bearer token caller.
///
/// Never rejects: a missing or invalid token yields `None`.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
///     match user {
///         Some(u) => format!("Welcome back, {}!", u.email),
///         None => "Welcome, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = state.verifier().verify_optional(bearer_token(parts));
        if let Some(user) = &user {
            set_sentry_user(user);
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/auth/me");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&parts_with(Some("bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&parts_with(Some("Basic dXNlcjpwYXNz"))), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts_with(None)), None);
    }
}
