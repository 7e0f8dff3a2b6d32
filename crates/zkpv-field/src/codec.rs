//! Decimal-string codec for field elements.
//!
//! This is the interoperability encoding used for circuit inputs and public
//! inputs: plain ASCII base-10, no sign, no whitespace, no radix prefix.
//! Leading zeros are accepted (`"007"` parses as 7). Values at or above the
//! modulus are **rejected**, never silently reduced, so every accepted string
//! maps to exactly one element and `parse(display(x)) == x` for all `x`.

use core::fmt;
use core::str::FromStr;

use crate::Fp64;

/// Why a decimal string could not be parsed as a field element.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFieldError {
    /// The string was empty.
    #[error("empty string")]
    Empty,
    /// A byte other than `0..=9` was found.
    #[error("invalid character {found:?} at byte {index}")]
    InvalidDigit {
        /// Byte offset of the offending character.
        index: usize,
        /// The offending character.
        found: char,
    },
    /// The integer does not fit below the field modulus.
    #[error("value is not below the field modulus {modulus}")]
    OutOfRange {
        /// Modulus of the target field.
        modulus: u64,
    },
}

impl<const P: u64> FromStr for Fp64<P> {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseFieldError::Empty);
        }
        let mut acc: u128 = 0;
        for (index, ch) in s.char_indices() {
            let digit = ch
                .to_digit(10)
                .ok_or(ParseFieldError::InvalidDigit { index, found: ch })?;
            acc = acc * 10 + u128::from(digit);
            // Past the modulus the value is out of range, unless a later
            // byte is not a digit at all.
            if acc >= u128::from(P) {
                if let Some((offset, found)) = s[index..]
                    .char_indices()
                    .find(|(_, c)| !c.is_ascii_digit())
                {
                    return Err(ParseFieldError::InvalidDigit {
                        index: index + offset,
                        found,
                    });
                }
                return Err(ParseFieldError::OutOfRange { modulus: P });
            }
        }
        // acc < P <= u64::MAX, so the narrowing is lossless.
        Ok(Self(acc as u64))
    }
}

impl<const P: u64> fmt::Display for Fp64<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Parse a slice of decimal strings, reporting the index of the first failure.
pub fn parse_decimal_vec<const P: u64, S: AsRef<str>>(
    items: &[S],
) -> Result<Vec<Fp64<P>>, (usize, ParseFieldError)> {
    items
        .iter()
        .enumerate()
        .map(|(i, s)| s.as_ref().parse::<Fp64<P>>().map_err(|e| (i, e)))
        .collect()
}

/// Render elements as canonical decimal strings.
#[must_use]
pub fn to_decimal_vec<const P: u64>(items: &[Fp64<P>]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}
