//! Core domain entities.
//!
//! - [`UrlRecord`] - A stored full URL ↔ shortcut code mapping
//! - [`NewUrlRecord`] - Input for creating one
//!
//! The sequence counter that seeds code generation has no entity of its own;
//! it is owned by the repository (see
//! [`crate::domain::repositories::UrlRepository::create_with_next_identifier`]).

pub mod url_record;

pub use url_record::{FIRST_IDENTIFIER, NewUrlRecord, UrlRecord};
