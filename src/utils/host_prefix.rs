//! Host-derived base codes.
//!
//! The base code is the first three characters of the registrable host label,
//! lower-cased and padded with `a`. It doubles as the storage partition key and
//! as the namespace prefix of every shortcut code created for that host.

use url::Url;

/// Number of characters in a base code.
pub const BASE_CODE_LENGTH: usize = 3;

const PADDING: char = 'a';

/// Returns the registrable label of a host name.
///
/// This is the second-to-last label, so `www.example.com`, `a.b.example.com`
/// and `example.com` all yield `example`. A single-label host such as
/// `localhost` is returned whole.
pub fn host_label(host: &str) -> &str {
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();

    match labels.len() {
        0 => host,
        1 => labels[0],
        n => labels[n - 2],
    }
}

/// Builds a base code from arbitrary text.
///
/// Only ASCII alphanumerics are kept. The result is always exactly
/// [`BASE_CODE_LENGTH`] lower-case characters.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(base_code("Example"), "exa");
/// assert_eq!(base_code("ab"), "aba");
/// ```
pub fn base_code(text: &str) -> String {
    let mut code: String = text
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(BASE_CODE_LENGTH)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    while code.len() < BASE_CODE_LENGTH {
        code.push(PADDING);
    }

    code
}

/// Base code for a target URL, derived from its host.
pub fn base_code_for_url(url: &Url) -> String {
    base_code(host_label(url.host_str().unwrap_or_default()))
}

/// Partition key of a stored shortcut code.
///
/// Shortcut codes start with the (re-cased) base code, so lower-casing their
/// first three characters recovers the partition the record was stored under.
pub fn partition_key_for_code(code: &str) -> String {
    base_code(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_host_label() {
        assert_eq!(host_label("www.example.com"), "example");
        assert_eq!(host_label("example.com"), "example");
        assert_eq!(host_label("a.b.example.com"), "example");
        assert_eq!(host_label("localhost"), "localhost");
        assert_eq!(host_label("example.com."), "example");
        assert_eq!(host_label(""), "");
    }

    #[test]
    fn test_base_code_truncates_and_lowercases() {
        assert_eq!(base_code("Example"), "exa");
        assert_eq!(base_code("GOOGLE"), "goo");
    }

    #[test]
    fn test_base_code_pads_short_labels() {
        assert_eq!(base_code("ab"), "aba");
        assert_eq!(base_code("x"), "xaa");
        assert_eq!(base_code(""), "aaa");
    }

    #[test]
    fn test_base_code_skips_non_alphanumerics() {
        assert_eq!(base_code("my-site"), "mys");
        assert_eq!(base_code("[::1]"), "1aa");
    }

    #[test]
    fn test_base_code_for_url() {
        assert_eq!(base_code_for_url(&url("http://example.com/page")), "exa");
        assert_eq!(base_code_for_url(&url("https://www.GitHub.com/rust")), "git");
        assert_eq!(base_code_for_url(&url("http://localhost:8080/")), "loc");
        assert_eq!(base_code_for_url(&url("http://x.io")), "xaa");
        assert_eq!(base_code_for_url(&url("http://192.168.1.20/")), "1aa");
    }

    #[test]
    fn test_partition_key_for_code() {
        assert_eq!(partition_key_for_code("ExAAaBbCc"), "exa");
        assert_eq!(partition_key_for_code("gOoAAAAAA"), "goo");
    }
}
