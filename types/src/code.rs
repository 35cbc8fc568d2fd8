//! One-time verification codes.

use std::fmt;
use thiserror::Error;

/// Number of digits in a one-time code unless configured otherwise.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Why a string was rejected as a one-time code.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CodeFormatError {
    #[error("code must be {expected} digits, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("code must contain digits only")]
    NonDigit,
}

/// A well-formed one-time code: exactly the configured number of ASCII digits.
///
/// Only [`parse`](Self::parse) builds one, and it has no serde impls.
/// `Debug` is redacted so codes never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Parse user input as a code of `length` digits.
    ///
    /// Surrounding whitespace is ignored; anything else that is not a digit
    /// is rejected.
    pub fn parse(input: &str, length: usize) -> Result<Self, CodeFormatError> {
        let trimmed = input.trim();
        let actual = trimmed.chars().count();
        if actual != length {
            return Err(CodeFormatError::WrongLength {
                expected: length,
                actual,
            });
        }
        if !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(CodeFormatError::NonDigit);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The digits in entry order.
    pub fn digits(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.bytes().map(|b| b - b'0')
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OtpCode(<{} digits>)", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_length_digits() {
        let code = OtpCode::parse(" 123456 ", 6).unwrap();
        assert_eq!(code.as_str(), "123456");
        assert_eq!(code.digits().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn rejects_short_and_long_input() {
        assert_eq!(
            OtpCode::parse("12345", 6),
            Err(CodeFormatError::WrongLength {
                expected: 6,
                actual: 5
            })
        );
        assert!(matches!(
            OtpCode::parse("1234567", 6),
            Err(CodeFormatError::WrongLength { actual: 7, .. })
        ));
    }

    #[test]
    fn rejects_letters() {
        assert_eq!(OtpCode::parse("12a456", 6), Err(CodeFormatError::NonDigit));
    }

    #[test]
    fn debug_does_not_leak_digits() {
        let code = OtpCode::parse("987654", 6).unwrap();
        assert!(!format!("{code:?}").contains("987654"));
    }
}
