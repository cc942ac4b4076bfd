//! Shortcut code composition and short URL rendering.

use crate::utils::letter_generator::{CodeGenError, LetterGenerator};
use crate::utils::text_entropier::TextEntropier;

/// Path segment under which short URLs are served.
pub const REDIRECT_PATH: &str = "/go/";

/// Builds shortcut codes and the public URLs that serve them.
///
/// A code is `entropize(base_code) + generate(length, seed)`. Only the base
/// code is re-cased; the seed-driven suffix is left untouched so that distinct
/// seeds keep producing distinct suffixes.
pub struct UrlShortener {
    letters: Box<dyn LetterGenerator>,
    entropier: Box<dyn TextEntropier>,
    public_base_url: String,
}

impl UrlShortener {
    /// Creates a shortener.
    ///
    /// `public_base_url` is the externally visible origin, e.g.
    /// `https://s.example.com`; a trailing slash is ignored.
    pub fn new(
        letters: Box<dyn LetterGenerator>,
        entropier: Box<dyn TextEntropier>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            letters,
            entropier,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Returns the shortcut code for a base code and seed.
    ///
    /// # Errors
    ///
    /// Propagates [`CodeGenError`] from the letter generator.
    pub fn get_shortcut_code(
        &self,
        length: u8,
        base_code: &str,
        seed: u64,
    ) -> Result<String, CodeGenError> {
        let suffix = self.letters.generate(u16::from(length), seed)?;

        let mut code = self.entropier.entropize(base_code);
        code.push_str(&suffix);

        Ok(code)
    }

    /// Returns the public short URL serving a shortcut code.
    pub fn get_shortened_url_from_shortcut(&self, code: &str) -> String {
        format!("{}{}{}", self.public_base_url, REDIRECT_PATH, code)
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::letter_generator::{ConsistentLetterGenerator, RandomLetterGenerator};
    use crate::utils::text_entropier::UpperLowerCaseEntropier;

    fn shortener() -> UrlShortener {
        UrlShortener::new(
            Box::new(ConsistentLetterGenerator::default()),
            Box::new(UpperLowerCaseEntropier::seeded(11)),
            "http://localhost:3000/",
        )
    }

    #[test]
    fn test_code_is_entropized_prefix_plus_suffix() {
        let code = shortener().get_shortcut_code(6, "exa", 1).unwrap();

        assert_eq!(code.len(), 9);
        assert_eq!(code[..3].to_lowercase(), "exa");
        assert_eq!(&code[3..], "AAAAAA");
    }

    #[test]
    fn test_suffix_is_not_recased() {
        let shortener = shortener();
        let generator = ConsistentLetterGenerator::default();

        for seed in [2, 53, 777, 123_456] {
            let code = shortener.get_shortcut_code(4, "goo", seed).unwrap();
            assert_eq!(&code[3..], generator.generate(4, seed).unwrap());
        }
    }

    #[test]
    fn test_distinct_seeds_distinct_codes() {
        let shortener = shortener();

        let first = shortener.get_shortcut_code(3, "exa", 10).unwrap();
        let second = shortener.get_shortcut_code(3, "exa", 11).unwrap();

        assert_ne!(first[3..], second[3..]);
    }

    #[test]
    fn test_errors_propagate() {
        let shortener = shortener();

        assert!(matches!(
            shortener.get_shortcut_code(0, "exa", 1),
            Err(CodeGenError::InvalidArgument(_))
        ));
        assert!(matches!(
            shortener.get_shortcut_code(1, "exa", 53),
            Err(CodeGenError::RangeExceeded { .. })
        ));
    }

    #[test]
    fn test_random_letter_variant() {
        let shortener = UrlShortener::new(
            Box::new(RandomLetterGenerator::seeded(5)),
            Box::new(UpperLowerCaseEntropier::seeded(5)),
            "http://localhost:3000",
        );

        let code = shortener.get_shortcut_code(6, "exa", 0).unwrap();
        assert_eq!(code.len(), 9);
        assert!(code[3..].chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_shortened_url_format() {
        let shortener = shortener();
        let url = shortener.get_shortened_url_from_shortcut("ExAbCdEfG");

        assert_eq!(url, "http://localhost:3000/go/ExAbCdEfG");
        assert!(url.starts_with(shortener.public_base_url()));
        assert!(url.ends_with("/ExAbCdEfG"));
    }
}
