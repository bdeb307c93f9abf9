//! CLI subcommands.

pub mod migrate;
pub mod seed;
pub mod token;

use secrecy::SecretString;

/// Read the database URL, preferring `API_DATABASE_URL` over `DATABASE_URL`.
pub(crate) fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();
    ["API_DATABASE_URL", "DATABASE_URL"]
        .into_iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.trim().is_empty()))
        .map(SecretString::from)
}
