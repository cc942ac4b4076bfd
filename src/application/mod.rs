//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! code generation, and background jobs. Services consume repository and queue
//! traits and provide a clean API for HTTP handlers and the admin tool.
//!
//! # Contents
//!
//! - [`services::url_shortener::UrlShortener`] - Shortcut code composition and short URLs
//! - [`services::link_service::LinkService`] - Shortening, resolution, and job handling
//! - [`job_worker`] - Background consumer for redirect counting and expiry

pub mod job_worker;
pub mod services;
