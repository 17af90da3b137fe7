//! Input validation helpers
//!
//! Length limits mirror the column sizes in `migrations/`.

use rust_decimal::Decimal;

use crate::error::{AppError, AppResult};

// ── Text length limits ──────────────────────────────────────────────

/// Titles, authors, person names
pub const MAX_NAME_LEN: usize = 200;

/// Genres, phone numbers, payment method labels
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// ISBN-10 / ISBN-13 with separators
pub const MAX_ISBN_LEN: usize = 32;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Shipping and profile addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Book descriptions and review comments
pub const MAX_LONG_TEXT_LEN: usize = 2000;

/// URLs / image references
pub const MAX_URL_LEN: usize = 2048;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 50;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Largest value a `NUMERIC(10,2)` price column holds
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

// ── Helpers ─────────────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long (max {max_len} chars)"
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(value: Option<&str>, field: &str, max_len: usize) -> AppResult<()> {
    match value {
        Some(v) if v.chars().count() > max_len => Err(AppError::validation(format!(
            "{field} is too long (max {max_len} chars)"
        ))),
        _ => Ok(()),
    }
}

pub fn validate_username(username: &str) -> AppResult<()> {
    let len = username.trim().chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
        return Err(AppError::validation(format!(
            "username must be between {MIN_USERNAME_LEN} and {MAX_USERNAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Loose shape check: one `@` with something on both sides and a dot in the domain.
pub fn validate_email(email: &str) -> AppResult<()> {
    validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    let valid = match email.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(AppError::validation("email must be a valid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(AppError::validation(format!(
            "password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_rating(rating: i32) -> AppResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(())
}

pub fn validate_quantity(quantity: i32) -> AppResult<()> {
    if quantity < 1 {
        return Err(AppError::validation("quantity must be at least 1"));
    }
    Ok(())
}

/// Rounds to cents, then checks the stored value is positive and fits the column.
pub fn validate_price(price: Decimal) -> AppResult<Decimal> {
    let cents = price.round_dp(2);
    if cents <= Decimal::ZERO {
        return Err(AppError::validation("price must be greater than 0"));
    }
    if cents > MAX_PRICE {
        return Err(AppError::validation(format!("price must not exceed {MAX_PRICE}")));
    }
    Ok(cents)
}

pub fn validate_stock(stock: i32) -> AppResult<()> {
    if stock < 0 {
        return Err(AppError::validation("stock must not be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn required_text_rejects_blank_and_long() {
        assert!(validate_required_text("Dune", "title", 10).is_ok());
        assert!(validate_required_text("   ", "title", 10).is_err());
        assert!(validate_required_text("abcdefghijk", "title", 10).is_err());
    }

    #[test]
    fn optional_text_allows_none() {
        assert!(validate_optional_text(None, "comment", 3).is_ok());
        assert!(validate_optional_text(Some("abcd"), "comment", 3).is_err());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("reader@bookstore.com").is_ok());
        assert!(validate_email("reader.bookstore.com").is_err());
        assert!(validate_email("reader@bookstore").is_err());
        assert!(validate_email("@bookstore.com").is_err());
        assert!(validate_email("a@b@c.com").is_err());
    }

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn quantity_and_price_must_be_positive() {
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(1).is_ok());
        assert!(validate_price(dec!(0)).is_err());
        assert!(validate_price(dec!(0.01)).is_ok());
        assert!(validate_stock(-1).is_err());
        assert!(validate_stock(0).is_ok());
    }

    #[test]
    fn price_is_checked_after_rounding_to_cents() {
        assert!(validate_price(dec!(0.004)).is_err());
        assert_eq!(validate_price(dec!(0.006)).unwrap(), dec!(0.01));
        assert_eq!(validate_price(dec!(99999999.99)).unwrap(), MAX_PRICE);
        assert!(validate_price(dec!(99999999.995)).is_err());
        assert!(validate_price(dec!(100000000.00)).is_err());
    }

    #[test]
    fn username_and_password_lengths() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("reader").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }
}
