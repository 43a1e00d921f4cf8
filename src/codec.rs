//! Radix identifier codec.
//!
//! Maps a non-negative integer to a short string over a symbol alphabet and
//! back: a base-N representation where N is the alphabet length and a
//! symbol's position in the alphabet is its digit value.
//!
//! ```rust
//! use pasted::Codec;
//!
//! let codec = Codec::default();
//! assert_eq!(codec.encode(61), "Z");
//! assert_eq!(codec.encode(62), "10");
//! assert_eq!(codec.decode("10").unwrap(), 62);
//! ```
//!
//! `encode(0)` is the empty string: the division loop never runs. Minted
//! identifiers are drawn from `1..`, so a stored paste never has an empty id.

use std::sync::Arc;

/// Digits, then lowercase, then uppercase. 62 symbols.
pub const DEFAULT_ALPHABET: &str =
    "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("alphabet needs at least two symbols, got {0}")]
    AlphabetTooShort(usize),

    #[error("alphabet repeats symbol {0:?}")]
    DuplicateSymbol(char),

    #[error("unknown symbol {symbol:?} at position {position}")]
    UnknownSymbol { symbol: char, position: usize },

    #[error("{0:?} does not fit in 64 bits")]
    Overflow(String),
}

/// A base-N codec over a fixed alphabet. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Codec {
    symbols: Arc<[char]>,
}

impl Codec {
    pub fn new(alphabet: &str) -> Result<Self, CodecError> {
        let symbols: Vec<char> = alphabet.chars().collect();
        if symbols.len() < 2 {
            return Err(CodecError::AlphabetTooShort(symbols.len()));
        }
        for (i, c) in symbols.iter().enumerate() {
            if symbols[..i].contains(c) {
                return Err(CodecError::DuplicateSymbol(*c));
            }
        }
        Ok(Self { symbols: symbols.into() })
    }

    /// Number of symbols, i.e. the radix.
    pub fn base(&self) -> u64 {
        self.symbols.len() as u64
    }

    pub fn encode(&self, mut value: u64) -> String {
        let base = self.base();
        let mut out = Vec::new();
        while value > 0 {
            out.push(self.symbols[(value % base) as usize]);
            value /= base;
        }
        out.iter().rev().collect()
    }

    pub fn decode(&self, text: &str) -> Result<u64, CodecError> {
        let base = self.base();
        text.chars().enumerate().try_fold(0u64, |acc, (position, symbol)| {
            let digit = self
                .index_of(symbol)
                .ok_or(CodecError::UnknownSymbol { symbol, position })?;
            acc.checked_mul(base)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(|| CodecError::Overflow(text.to_owned()))
        })
    }

    /// Whether `text` is a non-empty string of alphabet symbols.
    pub fn is_valid(&self, text: &str) -> bool {
        !text.is_empty() && text.chars().all(|c| self.index_of(c).is_some())
    }

    fn index_of(&self, symbol: char) -> Option<u64> {
        self.symbols.iter().position(|&c| c == symbol).map(|i| i as u64)
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self { symbols: DEFAULT_ALPHABET.chars().collect::<Vec<_>>().into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_encodes_to_empty() {
        let codec = Codec::default();
        assert_eq!(codec.encode(0), "");
        assert_eq!(codec.decode("").unwrap(), 0);
    }

    #[test]
    fn most_significant_symbol_first() {
        let codec = Codec::default();
        assert_eq!(codec.encode(1), "1");
        assert_eq!(codec.encode(10), "a");
        assert_eq!(codec.encode(36), "A");
        assert_eq!(codec.encode(62 * 62 + 2), "102");
    }

    #[test]
    fn decode_inverts_encode() {
        let codec = Codec::default();
        let samples = [1, 9, 61, 62, 3843, 3844, 123_456_789, (1 << 31) - 1, u64::MAX];
        for v in samples {
            assert_eq!(codec.decode(&codec.encode(v)).unwrap(), v, "{v}");
        }
    }

    #[test]
    fn custom_alphabet() {
        let binary = Codec::new("01").unwrap();
        assert_eq!(binary.encode(6), "110");
        assert_eq!(binary.decode("110").unwrap(), 6);
    }

    #[test]
    fn unknown_symbol_is_an_error() {
        let codec = Codec::default();
        assert_eq!(
            codec.decode("ab-c"),
            Err(CodecError::UnknownSymbol { symbol: '-', position: 2 }),
        );
    }

    #[test]
    fn overflow_is_an_error() {
        let codec = Codec::default();
        let too_long = "Z".repeat(12);
        assert!(matches!(codec.decode(&too_long), Err(CodecError::Overflow(_))));
    }

    #[test]
    fn rejects_bad_alphabets() {
        assert_eq!(Codec::new("x").err(), Some(CodecError::AlphabetTooShort(1)));
        // The historical alphabet listed `0` twice, which made 10 decode as 0.
        assert_eq!(
            Codec::new("01234567890abc").err(),
            Some(CodecError::DuplicateSymbol('0')),
        );
    }

    #[test]
    fn validates_identifiers() {
        let codec = Codec::default();
        assert!(codec.is_valid("aZ09"));
        assert!(!codec.is_valid(""));
        assert!(!codec.is_valid(".."));
        assert!(!codec.is_valid("a/b"));
    }
}
