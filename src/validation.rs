// Validation utilities module
// Custom validation functions for the admin request DTOs

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::costing::{parse_currency, parse_duration};

const MAX_IDENTIFIER_LEN: usize = 64;

/// Largest currency amount accepted from a request (one billion)
pub const MAX_CURRENCY_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Validates a catalog or roster identifier
/// Letters, digits, '-' and '_' only, 1 to 64 characters
pub fn validate_identifier(id: &str) -> Result<(), ValidationError> {
    let valid = !id.is_empty()
        && id.len() <= MAX_IDENTIFIER_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_identifier"))
    }
}

/// Validates that a displayed price contains a digit and stays within range
pub fn validate_currency_text(price: &str) -> Result<(), ValidationError> {
    if !price.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("invalid_currency"));
    }
    if !is_amount_in_range(parse_currency(price).abs()) {
        return Err(ValidationError::new("currency_out_of_range"));
    }
    Ok(())
}

/// Whether an amount lies in `0..=MAX_CURRENCY_AMOUNT`
pub fn is_amount_in_range(amount: Decimal) -> bool {
    amount >= Decimal::ZERO && amount <= MAX_CURRENCY_AMOUNT
}

/// Validates that a duration reads as a number of minutes ("30", "1h", "1h30")
pub fn validate_duration_text(duration: &str) -> Result<(), ValidationError> {
    let trimmed = duration.trim();
    if trimmed == "0" || parse_duration(trimmed) > 0 {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_duration"))
    }
}
