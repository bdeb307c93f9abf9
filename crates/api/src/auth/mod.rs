//! Bearer token verification.
//!
//! Tokens are HMAC-signed JWTs issued by the identity provider (Supabase in
//! production). The audience claim is not validated; `exp` is required.
//! `sub` and `email` must be present for the caller to count as
//! authenticated, `role` is optional.

mod error;

pub use error::{AuthError, IssueError};

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use inventory_core::Email;

use crate::config::JwtConfig;

/// Registered and private claims read from a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// Caller identity derived from a verified token. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: Email,
    pub role: Option<String>,
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = claims
            .sub
            .filter(|sub| !sub.is_empty())
            .ok_or(AuthError::MissingClaims)?;
        let email = claims
            .email
            .filter(|email| !email.is_empty())
            .ok_or(AuthError::MissingClaims)?;

        Ok(Self {
            user_id,
            email: Email::parse(&email)?,
            role: claims.role,
        })
    }
}

/// Verifies bearer tokens against the configured shared secret.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Build a verifier from JWT configuration.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(config.algorithm);
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            key: DecodingKey::from_secret(config.secret.expose_secret().as_bytes()),
            validation,
        }
    }

    /// Verify signature and expiry, then extract the caller.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] for malformed, tampered or expired
    /// tokens, and [`AuthError::MissingClaims`] / [`AuthError::InvalidEmail`]
    /// when the payload does not identify a caller.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)?;
        data.claims.try_into()
    }

    /// Verify a token that may be absent.
    ///
    /// No token and a rejected token both yield `None`: optional-auth routes
    /// treat the caller as a guest either way.
    #[must_use]
    pub fn verify_optional(&self, token: Option<&str>) -> Option<AuthenticatedUser> {
        let token = token?;
        match self.verify(token) {
            Ok(user) => Some(user),
            // A present-but-invalid token degrades to guest.
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid token on optional-auth route");
                None
            }
        }
    }
}

/// Sign a token for `subject` that expires after `ttl`.
///
/// Used by the CLI to mint development tokens and by tests.
///
/// # Errors
///
/// Returns [`IssueError::ExpiryOverflow`] if `ttl` pushes the expiry out of
/// range, and [`IssueError::Sign`] if signing fails.
pub fn issue_token(
    config: &JwtConfig,
    subject: &str,
    email: &Email,
    role: Option<&str>,
    ttl: Duration,
) -> Result<String, IssueError> {
    let now = Utc::now();
    let exp = now
        .checked_add_signed(ttl)
        .ok_or(IssueError::ExpiryOverflow)?;
    let claims = Claims {
        sub: Some(subject.to_string()),
        email: Some(email.to_string()),
        role: role.map(String::from),
        exp: exp.timestamp(),
        iat: Some(now.timestamp()),
    };

    Ok(sign_claims(config, &claims)?)
}

/// Sign arbitrary claims. Lets tests build tokens with missing fields.
///
/// # Errors
///
/// Returns the underlying `jsonwebtoken` error if signing fails.
pub fn sign_claims(
    config: &JwtConfig,
    claims: &Claims,
) -> Result<String, jsonwebtoken::errors::Error> {
    jsonwebtoken::encode(
        &Header::new(config.algorithm),
        claims,
        &EncodingKey::from_secret(config.secret.expose_secret().as_bytes()),
    )
}
