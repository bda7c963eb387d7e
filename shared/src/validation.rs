//! Validation helpers shared by services and tests

use rust_decimal::Decimal;

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate a phone number: digits with optional leading + and common
/// separators, at least 7 digits.
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    let valid_chars = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'));
    if digits >= 7 && valid_chars {
        Ok(())
    } else {
        Err("Invalid phone number")
    }
}

/// Quantities on transactions and order lines must be strictly positive.
pub fn validate_positive_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity > 0 {
        Ok(())
    } else {
        Err("Quantity must be greater than zero")
    }
}

/// Monetary amounts must not be negative.
pub fn validate_non_negative_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount >= Decimal::ZERO {
        Ok(())
    } else {
        Err("Amount cannot be negative")
    }
}

/// A discount is a percentage between 0 and 100.
pub fn validate_discount_percent(discount: Decimal) -> Result<(), &'static str> {
    if discount >= Decimal::ZERO && discount <= Decimal::ONE_HUNDRED {
        Ok(())
    } else {
        Err("Discount must be between 0 and 100")
    }
}

/// Passwords must be at least 8 characters with an upper-case letter,
/// a lower-case letter and a digit.
pub fn validate_password_strength(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if has_upper && has_lower && has_digit {
        Ok(())
    } else {
        Err("Password must contain upper-case, lower-case and digit characters")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn email_validation() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("nope").is_err());
    }

    #[test]
    fn phone_validation() {
        assert!(validate_phone("+20 100 555 0199").is_ok());
        assert!(validate_phone("12x34").is_err());
    }

    #[test]
    fn discount_bounds() {
        assert!(validate_discount_percent(Decimal::from(0)).is_ok());
        assert!(validate_discount_percent(Decimal::from(100)).is_ok());
        assert!(validate_discount_percent(Decimal::from_str("100.5").unwrap()).is_err());
        assert!(validate_discount_percent(Decimal::from(-1)).is_err());
    }

    #[test]
    fn password_strength() {
        assert!(validate_password_strength("Admin@Store123").is_ok());
        assert!(validate_password_strength("weak").is_err());
        assert!(validate_password_strength("alllowercase1").is_err());
    }
}
