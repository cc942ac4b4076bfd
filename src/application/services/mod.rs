//! Business logic services for the application layer.

pub mod link_service;
pub mod url_shortener;

pub use link_service::{LinkService, LinkSettings, LinkStats, ShortenOutcome};
pub use url_shortener::UrlShortener;
