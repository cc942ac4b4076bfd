//! DTOs for link shortening endpoint.

use serde::Deserialize;
use validator::Validate;

/// URL submitted for shortening, from the query string or a JSON body.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten.
    #[serde(rename = "urlToShortening")]
    #[validate(url(message = "Invalid URL format"))]
    pub url_to_shortening: String,
}
