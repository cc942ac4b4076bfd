//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a shortcut code to its full URL.
///
/// # Endpoint
///
/// `GET /go/{code}`
///
/// # Request Flow
///
/// 1. Look up the record by its exact (case-sensitive) code
/// 2. Queue a redirect count for the background worker (fire-and-forget)
/// 3. Return 302 Found, or 301 Moved Permanently when configured
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown or malformed.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let record = state.link_service.resolve(&code).await?;

    state.link_service.track_redirect(&record.shortcut_code).await;

    let status = if state.permanent_redirect {
        StatusCode::MOVED_PERMANENTLY
    } else {
        StatusCode::FOUND
    };

    Ok((status, [(header::LOCATION, record.full_url)]).into_response())
}
