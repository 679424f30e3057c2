use std::num::NonZeroUsize;

use crate::error::QuantityError;

/// Parse a requested quantity.
///
/// The trimmed text must consist of ASCII digits only, so signs, decimals and
/// words are rejected as [`QuantityError::NotANumber`]. Zero is
/// [`QuantityError::NotPositive`]. Values too large for `usize` saturate:
/// no stock can satisfy them anyway.
pub fn parse_quantity(text: &str) -> Result<NonZeroUsize, QuantityError> {
    let digits = text.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(QuantityError::NotANumber);
    }
    let value = digits.parse::<usize>().unwrap_or(usize::MAX);
    NonZeroUsize::new(value).ok_or(QuantityError::NotPositive)
}
