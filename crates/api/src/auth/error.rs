//! Authentication errors.

use inventory_core::EmailError;
use thiserror::Error;

/// Why a bearer token was not accepted.
///
/// Every variant maps to the same `401 Unauthorized` response; the variants
/// exist for logging.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization: Bearer` header on the request.
    #[error("Not authenticated")]
    MissingCredentials,

    /// Malformed token, bad signature, or expired.
    #[error("Invalid authentication token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// Token verified but lacks `sub` or `email`.
    #[error("Invalid token payload")]
    MissingClaims,

    /// The `email` claim is not a valid address.
    #[error("Invalid token payload: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// Why a token could not be issued.
#[derive(Debug, Error)]
pub enum IssueError {
    /// `now + ttl` is past the largest representable timestamp.
    #[error("token lifetime is too long")]
    ExpiryOverflow,

    #[error("failed to sign token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}
