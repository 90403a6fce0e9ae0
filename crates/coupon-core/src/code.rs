//! # Coupon Code Generation
//!
//! Codes are what shoppers type at checkout, so they stay short and
//! unambiguous to read aloud: [`COUPON_CODE_LENGTH`] characters drawn from
//! [`COUPON_CODE_ALPHABET`].
//!
//! Uniqueness is not checked here. The store owns the `UNIQUE(code)` index and
//! reports a collision as a unique violation.

use rand::Rng;

use crate::{COUPON_CODE_ALPHABET, COUPON_CODE_LENGTH};

/// Generates a random coupon code such as `K7Q2ZP0M4XRA`.
pub fn generate_coupon_code() -> String {
    let mut rng = rand::rng();
    (0..COUPON_CODE_LENGTH)
        .map(|_| {
            let index = rng.random_range(0..COUPON_CODE_ALPHABET.len());
            char::from(COUPON_CODE_ALPHABET[index])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_code_shape() {
        for _ in 0..100 {
            let code = generate_coupon_code();
            assert_eq!(code.len(), 12);
            assert!(code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_codes_differ() {
        let codes: HashSet<String> = (0..50).map(|_| generate_coupon_code()).collect();
        assert!(codes.len() > 45);
    }
}
