//! Routes demonstrating required and optional authentication.

use axum::Json;
use serde_json::{Value, json};

use crate::auth::AuthenticatedUser;
use crate::middleware::{OptionalAuth, RequireAuth};

/// `GET /auth/me` - the caller's identity.
pub async fn me(RequireAuth(user): RequireAuth) -> Json<AuthenticatedUser> {
    Json(user)
}

/// `GET /auth/protected`
pub async fn protected(RequireAuth(user): RequireAuth) -> Json<Value> {
    Json(json!({
        "message": format!("Hello {}!", user.email),
        "user_id": user.user_id,
        "email": user.email,
        "role": user.role,
        "authentication": "required",
    }))
}

/// `GET /auth/optional` - greets callers with or without a token.
pub async fn optional(OptionalAuth(user): OptionalAuth) -> Json<Value> {
    Json(match user {
        Some(user) => json!({
            "message": format!("Welcome back, {}!", user.email),
            "user_id": user.user_id,
            "authenticated": true,
        }),
        None => json!({
            "message": "Welcome, guest!",
            "authenticated": false,
        }),
    })
}
