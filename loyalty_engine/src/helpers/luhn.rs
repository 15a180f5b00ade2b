//! Order number validation.
//!
//! Order numbers arrive as raw request bodies. A valid number is a non-empty run of ASCII digits (surrounding
//! whitespace is ignored) whose Luhn checksum is zero. Leading zeros do not change the checksum, so they are stripped
//! and `0079927398713` names the same order as `79927398713`.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderNumberError {
    #[error("Order number is malformed. {0}")]
    MalformedInput(String),
    #[error("Order number {0} failed the Luhn checksum")]
    InvalidChecksum(String),
}

/// Validates and normalizes a raw order number, returning the digit string on success.
pub fn validate_order_number(raw: &[u8]) -> Result<String, OrderNumberError> {
    let trimmed = trim_ascii_whitespace(raw);
    if trimmed.is_empty() {
        return Err(OrderNumberError::MalformedInput("The order number is empty".into()));
    }
    if let Some(b) = trimmed.iter().find(|b| !b.is_ascii_digit()) {
        return Err(OrderNumberError::MalformedInput(format!(
            "Unexpected character '{}' in order number",
            char::from(*b).escape_default()
        )));
    }
    // Every byte is an ASCII digit at this point
    let significant = trimmed.iter().position(|b| *b != b'0').unwrap_or(trimmed.len() - 1);
    let digits = String::from_utf8_lossy(&trimmed[significant..]).into_owned();
    if luhn_checksum_is_valid(&digits) {
        Ok(digits)
    } else {
        Err(OrderNumberError::InvalidChecksum(digits))
    }
}

fn trim_ascii_whitespace(raw: &[u8]) -> &[u8] {
    let start = raw.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(raw.len());
    let end = raw.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |i| i + 1);
    &raw[start..end]
}

/// Standard mod-10 check: starting from the rightmost digit, every second digit is doubled (subtracting 9 if the
/// result exceeds 9), and the sum of all digits must be divisible by 10. Returns false for anything that is not a
/// non-empty digit string.
pub fn luhn_checksum_is_valid(digits: &str) -> bool {
    if digits.is_empty() {
        return false;
    }
    let mut sum = 0u32;
    for (i, c) in digits.bytes().rev().enumerate() {
        if !c.is_ascii_digit() {
            return false;
        }
        let mut d = u32::from(c - b'0');
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}
