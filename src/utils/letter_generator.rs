//! Letter generators producing the seed-driven suffix of a shortcut code.
//!
//! Two strategies are provided:
//!
//! - [`ConsistentLetterGenerator`] - a pure function of the seed. Every seed in
//!   `1..=N^length` maps to a distinct string, which is what keeps shortcut codes
//!   collision-free when the seed comes from the sequence counter.
//! - [`RandomLetterGenerator`] - ignores the seed and draws uppercase letters from
//!   a random source. Uniqueness must then be enforced by a repository lookup.

use std::collections::HashSet;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Default alphabet: 52 letters ordered `A a B b ... Z z`.
pub const DEFAULT_ALPHABET: &str = "AaBbCcDdEeFfGgHhIiJjKkLlMmNnOoPpQqRrSsTtUuVvWwXxYyZz";

/// Errors raised while generating shortcut codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeGenError {
    /// A length, seed, or alphabet that can never produce a code.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The seed is past the last code available for the requested length.
    ///
    /// This is an operational condition: the configured code length has to grow.
    #[error(
        "seed {seed} exceeds the {capacity} codes available for length {length}; increase the code length"
    )]
    RangeExceeded {
        seed: u64,
        length: u16,
        capacity: u128,
    },
}

/// Produces a fixed-length string of letters for a seed.
pub trait LetterGenerator: Send + Sync {
    /// Generates exactly `length` characters.
    ///
    /// # Errors
    ///
    /// Returns [`CodeGenError::InvalidArgument`] for a zero length (and, for
    /// seed-driven implementations, a zero seed) and
    /// [`CodeGenError::RangeExceeded`] when the seed space is exhausted.
    fn generate(&self, length: u16, seed: u64) -> Result<String, CodeGenError>;
}

/// Deterministic generator mapping seeds onto strings over a fixed alphabet.
///
/// `seed - 1` is treated as an index into all length-`length` strings ordered
/// first-symbol-major, and decomposed into base-N digits, most significant first.
#[derive(Debug, Clone)]
pub struct ConsistentLetterGenerator {
    alphabet: Vec<char>,
}

impl ConsistentLetterGenerator {
    /// Creates a generator over the given alphabet.
    ///
    /// # Errors
    ///
    /// Returns [`CodeGenError::InvalidArgument`] if the alphabet is empty or
    /// contains a symbol twice (duplicates would break the seed/string bijection).
    pub fn new(alphabet: &str) -> Result<Self, CodeGenError> {
        let symbols: Vec<char> = alphabet.chars().collect();

        if symbols.is_empty() {
            return Err(CodeGenError::InvalidArgument(
                "alphabet must contain at least one symbol".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(symbols.len());
        if let Some(duplicate) = symbols.iter().find(|c| !seen.insert(**c)) {
            return Err(CodeGenError::InvalidArgument(format!(
                "alphabet contains '{duplicate}' more than once"
            )));
        }

        Ok(Self { alphabet: symbols })
    }

    /// Number of symbols in the alphabet.
    pub fn base(&self) -> usize {
        self.alphabet.len()
    }

    /// Number of distinct codes of the given length, or `None` if it does not fit in `u128`.
    pub fn capacity(&self, length: u16) -> Option<u128> {
        (self.alphabet.len() as u128).checked_pow(u32::from(length))
    }
}

impl Default for ConsistentLetterGenerator {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.chars().collect(),
        }
    }
}

impl LetterGenerator for ConsistentLetterGenerator {
    fn generate(&self, length: u16, seed: u64) -> Result<String, CodeGenError> {
        if length < 1 {
            return Err(CodeGenError::InvalidArgument(
                "code length must be at least 1".to_string(),
            ));
        }

        if seed < 1 {
            return Err(CodeGenError::InvalidArgument(
                "seed must be at least 1".to_string(),
            ));
        }

        let mut index = u128::from(seed - 1);

        if let Some(capacity) = self.capacity(length)
            && index >= capacity
        {
            return Err(CodeGenError::RangeExceeded {
                seed,
                length,
                capacity,
            });
        }

        let base = self.alphabet.len() as u128;
        let mut letters = vec![self.alphabet[0]; usize::from(length)];

        for slot in letters.iter_mut().rev() {
            *slot = self.alphabet[(index % base) as usize];
            index /= base;
        }

        Ok(letters.into_iter().collect())
    }
}

/// Generator drawing independent uppercase ASCII letters. The seed is ignored.
pub struct RandomLetterGenerator {
    rng: Mutex<StdRng>,
}

impl RandomLetterGenerator {
    /// Creates a generator seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates a reproducible generator, mostly useful in tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomLetterGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl LetterGenerator for RandomLetterGenerator {
    fn generate(&self, length: u16, _seed: u64) -> Result<String, CodeGenError> {
        if length < 1 {
            return Err(CodeGenError::InvalidArgument(
                "code length must be at least 1".to_string(),
            ));
        }

        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        Ok((0..length)
            .map(|_| char::from(rng.random_range(b'A'..=b'Z')))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_alphabet_is_52_unique_letters() {
        let generator = ConsistentLetterGenerator::default();
        assert_eq!(generator.base(), 52);
        assert!(ConsistentLetterGenerator::new(DEFAULT_ALPHABET).is_ok());
    }

    #[test]
    fn test_single_letter_bounds() {
        let generator = ConsistentLetterGenerator::default();
        let alphabet: Vec<char> = DEFAULT_ALPHABET.chars().collect();

        assert_eq!(generator.generate(1, 1).unwrap(), alphabet[0].to_string());
        assert_eq!(generator.generate(1, 52).unwrap(), alphabet[51].to_string());
        assert!(matches!(
            generator.generate(1, 53),
            Err(CodeGenError::RangeExceeded {
                seed: 53,
                length: 1,
                capacity: 52
            })
        ));
    }

    #[test]
    fn test_most_significant_digit_first() {
        let generator = ConsistentLetterGenerator::new("ab").unwrap();

        assert_eq!(generator.generate(3, 1).unwrap(), "aaa");
        assert_eq!(generator.generate(3, 2).unwrap(), "aab");
        assert_eq!(generator.generate(3, 3).unwrap(), "aba");
        assert_eq!(generator.generate(3, 5).unwrap(), "baa");
        assert_eq!(generator.generate(3, 8).unwrap(), "bbb");
        assert!(generator.generate(3, 9).is_err());
    }

    #[test]
    fn test_default_alphabet_multi_letter() {
        let generator = ConsistentLetterGenerator::default();

        assert_eq!(generator.generate(2, 1).unwrap(), "AA");
        assert_eq!(generator.generate(2, 2).unwrap(), "Aa");
        assert_eq!(generator.generate(2, 53).unwrap(), "aA");
        assert_eq!(generator.generate(2, 52 * 52).unwrap(), "zz");
        assert!(generator.generate(2, 52 * 52 + 1).is_err());
    }

    #[test]
    fn test_output_length_and_symbols() {
        let generator = ConsistentLetterGenerator::default();

        for seed in [1, 2, 51, 52, 53, 1_000, 140_608, 19_770_609_664] {
            let code = generator.generate(6, seed).unwrap();
            assert_eq!(code.chars().count(), 6);
            assert!(code.chars().all(|c| DEFAULT_ALPHABET.contains(c)));
        }
    }

    #[test]
    fn test_injective_over_full_range() {
        let generator = ConsistentLetterGenerator::new("xyz").unwrap();
        let capacity = generator.capacity(4).unwrap() as u64;

        let codes: HashSet<String> = (1..=capacity)
            .map(|seed| generator.generate(4, seed).unwrap())
            .collect();

        assert_eq!(codes.len() as u64, capacity);
        assert!(matches!(
            generator.generate(4, capacity + 1),
            Err(CodeGenError::RangeExceeded { .. })
        ));
    }

    #[test]
    fn test_injective_default_alphabet_sample() {
        let generator = ConsistentLetterGenerator::default();

        let codes: HashSet<String> = (1..=20_000)
            .map(|seed| generator.generate(3, seed).unwrap())
            .collect();

        assert_eq!(codes.len(), 20_000);
    }

    #[test]
    fn test_invalid_arguments() {
        let generator = ConsistentLetterGenerator::default();

        assert!(matches!(
            generator.generate(0, 1),
            Err(CodeGenError::InvalidArgument(_))
        ));
        assert!(matches!(
            generator.generate(3, 0),
            Err(CodeGenError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_huge_length_never_exceeds_range() {
        let generator = ConsistentLetterGenerator::default();
        let code = generator.generate(40, u64::MAX).unwrap();

        assert_eq!(code.chars().count(), 40);
        assert!(code.starts_with("AAAAAAAAAAAAAAAAAAAAAAAAAAAA"));
    }

    #[test]
    fn test_rejects_bad_alphabets() {
        assert!(ConsistentLetterGenerator::new("").is_err());

        let err = ConsistentLetterGenerator::new("abca").unwrap_err();
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn test_random_generator_uppercase_and_length() {
        let generator = RandomLetterGenerator::seeded(7);

        for length in [1, 6, 32] {
            let code = generator.generate(length, 0).unwrap();
            assert_eq!(code.len(), usize::from(length));
            assert!(code.chars().all(|c| c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_random_generator_ignores_seed() {
        let first = RandomLetterGenerator::seeded(42);
        let second = RandomLetterGenerator::seeded(42);

        assert_eq!(
            first.generate(8, 1).unwrap(),
            second.generate(8, 999).unwrap()
        );
    }

    #[test]
    fn test_random_generator_zero_length() {
        let generator = RandomLetterGenerator::new();
        assert!(generator.generate(0, 1).is_err());
    }
}
