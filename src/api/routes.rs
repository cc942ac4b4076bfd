//! API route configuration.

use crate::api::handlers::{health_handler, redirect_handler, shorten_handler};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Public routes of the shortener.
///
/// # Endpoints
///
/// - `GET|POST /shorten`    - Shorten a URL, answer with the short URL as text
/// - `GET      /go/{code}`  - Redirect to the full URL
/// - `GET      /health`     - Storage and job queue checks
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", get(shorten_handler).post(shorten_handler))
        .route("/go/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
}
