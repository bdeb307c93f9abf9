//! Validated value types for the inventory catalog.

pub mod email;
pub mod id;
pub mod label;
pub mod page;
pub mod slug;

pub use email::{Email, EmailError};
pub use id::*;
pub use label::{CatalogName, Label, LabelError, ProductName};
pub use page::Page;
pub use slug::{Slug, SlugError};
