//! Inventory Core - Shared catalog types.
//!
//! This crate provides the types used across all inventory components:
//! - `api` - JWT-authenticated HTTP API over the catalog
//! - `cli` - Command-line tools for migrations, seeding and dev tokens
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Validated newtypes: UUID-backed IDs, slugs, names, emails, pages
//! - [`catalog`] - Products, categories and collections with their payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;

pub use catalog::*;
pub use types::*;
