//! # Quantity Parsing and Display
//!
//! Turns user-typed text into decimals and decimals back into text.
//!
//! Parsing is explicit: a malformed string is an error, never a silent zero.
//! The one lenient entry point, [`parse_quantity_or_zero`], is named for what
//! it does and logs every fallback.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

use crate::error::ValidationError;
use crate::rounding::{Precision, RoundingPolicy};

/// Field name used in quantity messages.
pub const QUANTITY_FIELD: &str = "quantity";

/// Parses a quantity typed by a user or read from an import cell.
///
/// ## Accepted
/// - `"12"`, `"12.5"`, `"-3"`, `" 4.000 "`
/// - `"5,5"` (comma as decimal separator, only when there is no `.`)
///
/// ## Rejected
/// - empty input (`Required`)
/// - exponents, `NaN`, `inf`, thousands separators, stray text
///   (`MalformedQuantity`)
///
/// ## Example
/// ```rust
/// use medida_core::quantity::parse_quantity;
///
/// assert_eq!(parse_quantity("5,5").unwrap().to_string(), "5.5");
/// assert!(parse_quantity("1e3").is_err());
/// assert!(parse_quantity("1,000.5").is_err());
/// ```
pub fn parse_quantity(raw: &str) -> Result<Decimal, ValidationError> {
    parse_field(raw, QUANTITY_FIELD)
}

/// Same as [`parse_quantity`] but reports errors against `field`.
pub fn parse_field(raw: &str, field: &str) -> Result<Decimal, ValidationError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let malformed = || ValidationError::MalformedQuantity {
        field: field.to_string(),
        raw: trimmed.to_string(),
    };

    let normalized = if trimmed.contains('.') {
        trimmed.to_string()
    } else if trimmed.matches(',').count() == 1 {
        trimmed.replacen(',', ".", 1)
    } else {
        trimmed.to_string()
    };

    let (negative, digits) = match normalized.as_bytes().first() {
        Some(b'-') => (true, &normalized[1..]),
        Some(b'+') => (false, &normalized[1..]),
        _ => (false, normalized.as_str()),
    };

    // Decimal::from_str tolerates underscores; user input must not.
    let well_formed = digits.matches('.').count() <= 1
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().any(|c| c.is_ascii_digit());
    if !well_formed {
        return Err(malformed());
    }

    let digits = if digits.starts_with('.') {
        format!("0{}", digits)
    } else {
        digits.to_string()
    };
    let value = Decimal::from_str(&digits).map_err(|_| malformed())?;

    // Decimal rounds past 28 fractional digits; such input is not representable.
    let typed_fraction = digits
        .split_once('.')
        .map_or(0, |(_, fraction)| fraction.trim_end_matches('0').len());
    if fraction_digits(value) as usize != typed_fraction {
        return Err(malformed());
    }

    Ok(if negative { -value } else { value })
}

/// Lenient parse for non-critical text cleanup before persistence.
///
/// Falls back to zero on any parse failure and logs a warning naming the
/// field. Never use this for stock or sale quantities.
pub fn parse_quantity_or_zero(raw: &str, field: &str) -> Decimal {
    match parse_field(raw, field) {
        Ok(value) => value,
        Err(err) => {
            warn!(field, raw, error = %err, "Quantity parse failed, falling back to zero");
            Decimal::ZERO
        }
    }
}

/// Significant fractional digits (trailing zeros do not count).
///
/// ```rust
/// use medida_core::quantity::fraction_digits;
/// use rust_decimal::Decimal;
///
/// assert_eq!(fraction_digits("12.3456".parse::<Decimal>().unwrap()), 4);
/// assert_eq!(fraction_digits("4.500".parse::<Decimal>().unwrap()), 1);
/// ```
#[inline]
pub fn fraction_digits(value: Decimal) -> u32 {
    value.normalize().scale()
}

/// Formats a quantity for messages.
///
/// Decimal products show exactly three decimals ("2.500"); whole-unit
/// products show an integer ("3").
pub fn format_quantity(value: Decimal, allows_decimals: bool, policy: &RoundingPolicy) -> String {
    if allows_decimals {
        let decimals = Precision::Quantity.decimals();
        let mut rounded = policy.round(value, decimals);
        rounded.rescale(decimals);
        rounded.to_string()
    } else {
        policy.round(value, 0).normalize().to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_plain_numbers() {
        assert_eq!(parse_quantity("12").unwrap(), dec!(12));
        assert_eq!(parse_quantity(" 12.5 ").unwrap(), dec!(12.5));
        assert_eq!(parse_quantity("-3").unwrap(), dec!(-3));
        assert_eq!(parse_quantity("+3.25").unwrap(), dec!(3.25));
        assert_eq!(parse_quantity(".5").unwrap(), dec!(0.5));
        assert_eq!(parse_quantity("2.5000000000000000000000000000000").unwrap(), dec!(2.5));
    }

    #[test]
    fn test_parse_comma_separator() {
        assert_eq!(parse_quantity("5,5").unwrap(), dec!(5.5));
        assert!(parse_quantity("1,000,5").is_err());
        assert!(parse_quantity("1,000.5").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_quantity(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            parse_quantity("   "),
            Err(ValidationError::Required { .. })
        ));
        for raw in [
            "abc",
            "1e3",
            "NaN",
            "inf",
            "1_000",
            "1.2.3",
            "-",
            ".",
            "12kg",
            "1.000000000000000000000000000001",
            "0.00000000000000000000000000001",
            "79228162514264337593543950335.5",
        ] {
            assert!(
                matches!(parse_quantity(raw), Err(ValidationError::MalformedQuantity { .. })),
                "expected {raw:?} to be malformed"
            );
        }
    }

    #[test]
    fn test_parse_or_zero_falls_back() {
        assert_eq!(parse_quantity_or_zero("abc", "peso_neto"), Decimal::ZERO);
        assert_eq!(parse_quantity_or_zero("7,25", "peso_neto"), dec!(7.25));
    }

    #[test]
    fn test_fraction_digits() {
        assert_eq!(fraction_digits(dec!(5)), 0);
        assert_eq!(fraction_digits(dec!(5.000)), 0);
        assert_eq!(fraction_digits(dec!(5.125)), 3);
        assert_eq!(fraction_digits(dec!(12.3456)), 4);
    }

    #[test]
    fn test_format_quantity() {
        let policy = RoundingPolicy::default();
        assert_eq!(format_quantity(dec!(2.5), true, &policy), "2.500");
        assert_eq!(format_quantity(dec!(4.53592), true, &policy), "4.536");
        assert_eq!(format_quantity(dec!(3), false, &policy), "3");
        assert_eq!(format_quantity(dec!(3.000), false, &policy), "3");
        assert_eq!(format_quantity(dec!(2.5), false, &policy), "3");
    }
}
