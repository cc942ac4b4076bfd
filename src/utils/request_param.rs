//! Named parameter lookup across the query string and a JSON request body.

use serde_json::Value;
use tracing::debug;

/// Result of looking up a request parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestParam {
    Absent,
    Present(String),
}

impl RequestParam {
    /// Returns the value if present and not blank.
    pub fn non_blank(self) -> Option<String> {
        match self {
            Self::Present(value) if !value.trim().is_empty() => Some(value),
            _ => None,
        }
    }
}

/// Looks up `name` in the raw query string first, then in a JSON object body.
///
/// A key present in the query string wins even when its value is empty. Body
/// fields that are JSON strings are returned verbatim; other non-null scalars are
/// returned in their JSON text form. An unparsable body counts as absent.
pub fn extract_param(raw_query: Option<&str>, body: &[u8], name: &str) -> RequestParam {
    if let Some(query) = raw_query
        && let Some((_, value)) =
            url::form_urlencoded::parse(query.as_bytes()).find(|(key, _)| key == name)
    {
        return RequestParam::Present(value.into_owned());
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return RequestParam::Absent;
    }

    let payload: Value = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(e) => {
            debug!("Ignoring request body that is not JSON: {}", e);
            return RequestParam::Absent;
        }
    };

    match payload.get(name) {
        None | Some(Value::Null) => RequestParam::Absent,
        Some(Value::String(value)) => RequestParam::Present(value.clone()),
        Some(other) => RequestParam::Present(other.to_string()),
    }
}
