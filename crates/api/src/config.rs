//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `API_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `API_JWT_SECRET` - HMAC secret shared with the identity provider
//!   (falls back to `SUPABASE_JWT_SECRET`; min 32 chars, high entropy)
//!
//! ## Optional
//! - `API_HOST` - Bind address (default: 127.0.0.1)
//! - `API_PORT` - Listen port (default: 8000)
//! - `API_JWT_ALGORITHM` - `HS256`, `HS384` or `HS512` (default: HS256)
//! - `CORS_ORIGINS` - Comma-separated allowed origins (default: <http://localhost:3000>)
//! - `LOG_LEVEL` - Default level for this crate when `RUST_LOG` is unset (default: info)
//! - `LOG_FORMAT` - `text` or `json` (default: text)
//! - `API_DEFAULT_PAGE_LIMIT` - Page size when `limit` is omitted (default: 100)
//! - `API_MAX_PAGE_LIMIT` - Largest accepted `limit` (default: 500)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Service name reported by `/` and `/health`.
pub const PROJECT_NAME: &str = "Inventory Management API";

/// Service version reported by `/` and `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix for all versioned routes.
pub const API_PREFIX: &str = "/api/v1";

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Flattened JSON objects, one per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'text' or 'json', got '{other}'")),
        }
    }
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer token verification settings
    pub jwt: JwtConfig,
    /// Origins allowed by the CORS layer
    pub cors_origins: Vec<String>,
    /// Default tracing level for this crate
    pub log_level: String,
    /// Tracing output format
    pub log_format: LogFormat,
    /// Listing window defaults
    pub pagination: PaginationConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Bearer token verification settings.
///
/// Implements `Debug` manually to redact the secret.
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC signing secret
    pub secret: SecretString,
    /// HMAC algorithm
    pub algorithm: Algorithm,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl JwtConfig {
    /// Load only the token settings, for tools that mint tokens without serving.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the secret is missing or weak, or the
    /// algorithm is not an HMAC variant.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let lookup = |key: &str| std::env::var(key).ok();
        Self::load(&Env(&lookup))
    }

    fn load<F: Fn(&str) -> Option<String>>(env: &Env<'_, F>) -> Result<Self, ConfigError> {
        let secret = env.with_fallback("API_JWT_SECRET", "SUPABASE_JWT_SECRET")?;
        validate_jwt_secret(&secret, "API_JWT_SECRET")?;
        let algorithm = parse_algorithm(&env.or_default("API_JWT_ALGORITHM", "HS256"))?;
        Ok(Self { secret, algorithm })
    }
}

/// Listing window defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    /// `limit` applied when a request omits it
    pub default_limit: u32,
    /// Largest `limit` a request may ask for
    pub max_limit: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 100,
            max_limit: 500,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the JWT secret fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`ApiConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let database_url = env.with_fallback("API_DATABASE_URL", "DATABASE_URL")?;
        let host = env.parsed_or("API_HOST", "127.0.0.1")?;
        let port = env.parsed_or("API_PORT", "8000")?;

        let jwt = JwtConfig::load(&env)?;

        let cors_origins = split_origins(&env.or_default("CORS_ORIGINS", "http://localhost:3000"));
        let log_level = env.or_default("LOG_LEVEL", "info").to_ascii_lowercase();
        let log_format = env.parsed_or("LOG_FORMAT", "text")?;

        let pagination = PaginationConfig {
            default_limit: env.parsed_or("API_DEFAULT_PAGE_LIMIT", "100")?,
            max_limit: env.parsed_or("API_MAX_PAGE_LIMIT", "500")?,
        };
        validate_pagination(pagination)?;

        Ok(Self {
            database_url,
            host,
            port,
            jwt,
            cors_origins,
            log_level,
            log_format,
            pagination,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Thin accessor over a variable lookup.
struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get and parse a variable with a default value.
    fn parsed_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Get a required secret, trying `primary` first and then the generic `fallback`.
    fn with_fallback(&self, primary: &str, fallback: &str) -> Result<SecretString, ConfigError> {
        self.optional(primary)
            .or_else(|| self.optional(fallback))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary.to_string()))
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

/// Parse an HMAC algorithm name.
fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(ConfigError::InvalidEnvVar(
            "API_JWT_ALGORITHM".to_string(),
            format!("unsupported algorithm '{other}' (expected HS256, HS384 or HS512)"),
        )),
    }
}

/// Reject a zero page size or a default larger than the ceiling.
fn validate_pagination(pagination: PaginationConfig) -> Result<(), ConfigError> {
    if pagination.max_limit == 0 {
        return Err(ConfigError::InvalidEnvVar(
            "API_MAX_PAGE_LIMIT".to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    if pagination.default_limit == 0 || pagination.default_limit > pagination.max_limit {
        return Err(ConfigError::InvalidEnvVar(
            "API_DEFAULT_PAGE_LIMIT".to_string(),
            format!("must be between 1 and {}", pagination.max_limit),
        ));
    }
    Ok(())
}

/// Validate that the JWT secret is long, not a placeholder, and high-entropy.
fn validate_jwt_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    validate_secret_strength(value, var_name)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}
