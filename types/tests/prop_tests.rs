use proptest::prelude::*;

use onboard_types::{CodeFormatError, OtpCode, Timestamp};

proptest! {
    /// Any string of exactly `len` digits parses as a code.
    #[test]
    fn digit_strings_of_right_length_parse(digits in "[0-9]{6}") {
        let code = OtpCode::parse(&digits, 6).unwrap();
        prop_assert_eq!(code.as_str(), digits.as_str());
    }

    /// Digit strings of any other length are rejected with the actual length.
    #[test]
    fn wrong_length_is_rejected(digits in "[0-9]{0,12}") {
        prop_assume!(digits.len() != 6);
        prop_assert_eq!(
            OtpCode::parse(&digits, 6),
            Err(CodeFormatError::WrongLength { expected: 6, actual: digits.len() })
        );
    }

    /// A single non-digit anywhere in a 6-char code is rejected.
    #[test]
    fn non_digit_is_rejected(prefix in "[0-9]{0,5}", bad in "[a-zA-Z#*]") {
        let mut input = prefix.clone();
        input.push_str(&bad);
        while input.chars().count() < 6 {
            input.push('0');
        }
        prop_assert_eq!(OtpCode::parse(&input, 6), Err(CodeFormatError::NonDigit));
    }

    /// remaining + elapsed covers the whole cooldown while it is running.
    #[test]
    fn remaining_plus_elapsed_is_cooldown(
        sent in 0u64..1_000_000,
        cooldown in 1u64..10_000,
        offset in 0u64..10_000,
    ) {
        let sent_at = Timestamp::new(sent);
        let now = Timestamp::new(sent + offset);
        let remaining = sent_at.remaining(cooldown, now);
        if offset < cooldown {
            prop_assert_eq!(remaining + offset, cooldown);
        } else {
            prop_assert_eq!(remaining, 0);
        }
    }

    /// Whatever the input, a parsed code only ever yields decimal digits.
    #[test]
    fn parsed_codes_yield_decimal_digits(input in "\\PC{0,8}") {
        if let Ok(code) = OtpCode::parse(&input, 6) {
            prop_assert!(code.digits().all(|d| d <= 9));
        }
    }
}
