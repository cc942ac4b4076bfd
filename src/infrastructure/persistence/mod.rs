//! Repository implementations.
//!
//! Concrete implementations of [`crate::domain::repositories::UrlRepository`].
//!
//! # Repositories
//!
//! - [`PgUrlRepository`] - PostgreSQL storage via SQLx
//! - [`InMemoryUrlRepository`] - Process-local storage for single instances and tests

pub mod in_memory_url_repository;
pub mod pg_url_repository;

pub use in_memory_url_repository::InMemoryUrlRepository;
pub use pg_url_repository::PgUrlRepository;
