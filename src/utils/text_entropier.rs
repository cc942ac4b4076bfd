//! Random upper/lower-case scrambling of short strings.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Applies a cosmetic, non-reversible transform to a string.
pub trait TextEntropier: Send + Sync {
    /// Returns a string with the same number of characters as `text`.
    fn entropize(&self, text: &str) -> String;
}

/// Lower-cases every letter, then upper-cases each one with probability 0.5.
///
/// Non-letters are copied unchanged. Letters whose case mapping is not a single
/// character (e.g. `ß`) are copied as-is so the character count never changes.
pub struct UpperLowerCaseEntropier {
    rng: Mutex<StdRng>,
}

impl UpperLowerCaseEntropier {
    /// Creates an entropier seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates a reproducible entropier.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for UpperLowerCaseEntropier {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEntropier for UpperLowerCaseEntropier {
    fn entropize(&self, text: &str) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        text.chars()
            .map(|c| {
                if !c.is_alphabetic() {
                    return c;
                }

                let lower = single_char(c.to_lowercase(), c);
                if rng.random_bool(0.5) {
                    single_char(lower.to_uppercase(), lower)
                } else {
                    lower
                }
            })
            .collect()
    }
}

fn single_char(mut mapped: impl Iterator<Item = char>, fallback: char) -> char {
    match (mapped.next(), mapped.next()) {
        (Some(c), None) => c,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_length_and_letters() {
        let entropier = UpperLowerCaseEntropier::seeded(1);

        for text in ["exa", "GoOgLe", "abcdefghijklmnopqrstuvwxyz", ""] {
            let result = entropier.entropize(text);
            assert_eq!(result.chars().count(), text.chars().count());
            assert_eq!(result.to_lowercase(), text.to_lowercase());
        }
    }

    #[test]
    fn test_non_letters_unchanged() {
        let entropier = UpperLowerCaseEntropier::seeded(2);
        let result = entropier.entropize("a1-b2_c3");

        let positions: Vec<(usize, char)> = result
            .chars()
            .enumerate()
            .filter(|(_, c)| !c.is_alphabetic())
            .collect();

        assert_eq!(positions, vec![(1, '1'), (2, '-'), (4, '2'), (5, '_'), (7, '3')]);
    }

    #[test]
    fn test_output_letters_are_case_variants() {
        let entropier = UpperLowerCaseEntropier::seeded(3);
        let input = "MixedCaseInput";
        let result = entropier.entropize(input);

        for (original, scrambled) in input.chars().zip(result.chars()) {
            assert!(original.eq_ignore_ascii_case(&scrambled));
        }
    }

    #[test]
    fn test_produces_both_cases() {
        let entropier = UpperLowerCaseEntropier::seeded(4);
        let result = entropier.entropize(&"a".repeat(256));

        assert!(result.chars().any(|c| c.is_ascii_uppercase()));
        assert!(result.chars().any(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn test_multi_char_case_mapping_kept() {
        let entropier = UpperLowerCaseEntropier::seeded(5);

        for _ in 0..32 {
            assert_eq!(entropier.entropize("ß").chars().count(), 1);
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let first = UpperLowerCaseEntropier::seeded(99);
        let second = UpperLowerCaseEntropier::seeded(99);

        assert_eq!(first.entropize("reproducible"), second.entropize("reproducible"));
    }
}
