//! Handler for link shortening endpoint.

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::ShortenRequest;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::request_param::extract_param;

/// Name of the request parameter carrying the URL.
pub const URL_PARAMETER: &str = "urlToShortening";

/// Shortens a URL and returns the short URL as plain text.
///
/// # Endpoint
///
/// `GET /shorten?urlToShortening=...` or `POST /shorten`
///
/// The parameter is read from the query string first, then from a JSON body:
///
/// ```json
/// { "urlToShortening": "https://example.com/some/page" }
/// ```
///
/// Shortening a URL that is already stored returns its existing short URL.
///
/// # Response
///
/// ```text
/// http://localhost:3000/go/ExAAAAAAB
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the parameter is missing, blank, or not an
/// absolute http(s) URL. Returns 500 if no code could be generated or stored.
pub async fn shorten_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<String, AppError> {
    let Some(url) = extract_param(query.as_deref(), &body, URL_PARAMETER).non_blank() else {
        return Err(AppError::bad_request(
            "Missing required parameter",
            json!({ "parameter": URL_PARAMETER }),
        ));
    };

    let request = ShortenRequest {
        url_to_shortening: url.trim().to_string(),
    };
    request.validate()?;

    let outcome = state
        .link_service
        .shorten(&request.url_to_shortening)
        .await?;

    Ok(outcome.short_url)
}
