//! Inventory API library.
//!
//! JWT-authenticated HTTP API over a catalog of products, categories and
//! collections. Exposed as a library so the binary, the CLI and the
//! integration tests share one router and one service layer.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
