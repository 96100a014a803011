//! Random token and authorization code generation.
//!
//! Codes and tokens are opaque fixed-length strings drawn from a
//! URL- and header-safe alphabet. The generator keeps no state; each call
//! is independent.

use rand::Rng;

/// Base62 alphabet: safe for URLs, query strings, and HTTP headers.
const BASE62: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generator for authorization codes, access tokens, and refresh tokens.
///
/// Values are drawn from the thread-local CSPRNG. At the default length of
/// 40 base62 characters a value carries ~238 bits of entropy, making
/// collisions across any realistic retention window negligible.
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    length: usize,
    alphabet: Vec<u8>,
}

impl TokenGenerator {
    /// Creates a generator producing values of the given length over the
    /// base62 alphabet.
    #[must_use]
    pub fn new(length: usize) -> Self {
        Self {
            length,
            alphabet: BASE62.to_vec(),
        }
    }

    /// Replaces the alphabet.
    ///
    /// The caller is responsible for choosing characters that survive URLs
    /// and HTTP headers unescaped.
    #[must_use]
    pub fn with_alphabet(mut self, alphabet: impl Into<Vec<u8>>) -> Self {
        self.alphabet = alphabet.into();
        self
    }

    /// The configured value length.
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Generates one random value.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| {
                let idx = rng.gen_range(0..self.alphabet.len());
                self.alphabet[idx] as char
            })
            .collect()
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new(40)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_length() {
        let generator = TokenGenerator::default();
        assert_eq!(generator.generate().len(), 40);
    }

    #[test]
    fn test_custom_length() {
        let generator = TokenGenerator::new(64);
        assert_eq!(generator.generate().len(), 64);
    }

    #[test]
    fn test_alphabet_membership() {
        let generator = TokenGenerator::default();
        let value = generator.generate();
        assert!(value.bytes().all(|b| BASE62.contains(&b)));
    }

    #[test]
    fn test_custom_alphabet() {
        let generator = TokenGenerator::new(32).with_alphabet(&b"abc123"[..]);
        let value = generator.generate();
        assert!(value.bytes().all(|b| b"abc123".contains(&b)));
    }

    #[test]
    fn test_values_are_independent() {
        let generator = TokenGenerator::default();
        assert_ne!(generator.generate(), generator.generate());
    }
}
