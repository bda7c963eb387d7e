//! Validation helper tests

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::validation::{
    validate_discount_percent, validate_email, validate_non_negative_amount,
    validate_password_strength, validate_phone, validate_positive_quantity,
};

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_email_accepts_plain_addresses() {
        assert!(validate_email("owner@store.example").is_ok());
        assert!(validate_email("a.b@c.d").is_ok());
    }

    #[test]
    fn test_email_rejects_garbage() {
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_phone_accepts_international_formats() {
        assert!(validate_phone("+971 4 555 0100").is_ok());
        assert!(validate_phone("(02) 1234-5678").is_ok());
    }

    #[test]
    fn test_phone_rejects_letters_and_short_numbers() {
        assert!(validate_phone("call me").is_err());
        assert!(validate_phone("12345").is_err());
    }

    #[test]
    fn test_quantity_must_be_positive() {
        assert!(validate_positive_quantity(1).is_ok());
        assert!(validate_positive_quantity(0).is_err());
        assert!(validate_positive_quantity(-5).is_err());
    }

    #[test]
    fn test_amount_must_be_non_negative() {
        assert!(validate_non_negative_amount(Decimal::ZERO).is_ok());
        assert!(validate_non_negative_amount(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_password_strength_rules() {
        assert!(validate_password_strength("Admin@Store123").is_ok());
        assert!(validate_password_strength("short1A").is_err());
        assert!(validate_password_strength("nouppercase1").is_err());
        assert!(validate_password_strength("NOLOWERCASE1").is_err());
        assert!(validate_password_strength("NoDigitsHere").is_err());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Positive quantities always pass, non-positive never do.
        #[test]
        fn prop_quantity_validation(q in -10_000i32..=10_000) {
            prop_assert_eq!(validate_positive_quantity(q).is_ok(), q > 0);
        }

        /// Discounts validate exactly on the closed 0-100 range.
        #[test]
        fn prop_discount_range(d in -200i64..=300) {
            let discount = Decimal::from(d);
            prop_assert_eq!(
                validate_discount_percent(discount).is_ok(),
                (0..=100).contains(&d)
            );
        }

        /// Amounts validate on sign alone.
        #[test]
        fn prop_amount_sign(cents in -1_000_000i64..=1_000_000) {
            let amount = Decimal::new(cents, 2);
            prop_assert_eq!(
                validate_non_negative_amount(amount).is_ok(),
                cents >= 0
            );
        }
    }
}
