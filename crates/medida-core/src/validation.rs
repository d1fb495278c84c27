//! # Validation Module
//!
//! Quantity and stock checks shared by sales, inventory movements and
//! imports.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Quantity Input Checks                              │
//! │                                                                         │
//! │  raw "12.3456"                                                         │
//! │       │                                                                 │
//! │       ├── empty / not a number?  → Required / MalformedQuantity (stop) │
//! │       ├── <= 0?                  → MustBePositive                      │
//! │       ├── > 3 decimals?          → PrecisionExceeded                   │
//! │       └── decimals on a whole-unit product? → DecimalNotAllowed        │
//! │                                                                         │
//! │  Every violated rule is reported, in this order.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validators never return `Err`. An empty list means the input is valid;
//! the caller decides whether a non-empty list blocks or warns.
//!
//! ## Usage
//! ```rust
//! use medida_core::validation::{validate_quantity_input, validate_stock};
//!
//! assert!(validate_quantity_input("5", false).is_empty());
//! assert_eq!(validate_quantity_input("5.5", false).len(), 1);
//! assert_eq!(validate_stock("10", "4", false).len(), 1);
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::quantity::{format_quantity, fraction_digits, parse_field, QUANTITY_FIELD};
use crate::rounding::{Precision, RoundingPolicy};

/// Maximum fractional digits accepted in any quantity input.
pub const MAX_QUANTITY_DECIMALS: u32 = Precision::Quantity.decimals();

const REQUESTED_FIELD: &str = "requested quantity";
const AVAILABLE_FIELD: &str = "available stock";

// =============================================================================
// Quantity Validator
// =============================================================================

/// Quantity rules bound to a rounding policy (used for message display).
#[derive(Debug, Clone, Copy, Default)]
pub struct QuantityValidator {
    policy: RoundingPolicy,
}

impl QuantityValidator {
    pub fn new(policy: RoundingPolicy) -> Self {
        QuantityValidator { policy }
    }

    /// Validates text typed for a product quantity.
    pub fn validate_quantity_input(&self, raw: &str, allows_decimals: bool) -> Vec<ValidationError> {
        match parse_field(raw, QUANTITY_FIELD) {
            Ok(value) => self.validate_quantity(value, allows_decimals),
            Err(err) => vec![err],
        }
    }

    /// Same rules for an already-parsed value.
    pub fn validate_quantity(&self, value: Decimal, allows_decimals: bool) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if value <= Decimal::ZERO {
            errors.push(ValidationError::MustBePositive {
                field: QUANTITY_FIELD.to_string(),
            });
        }

        let digits = fraction_digits(value);
        if digits > MAX_QUANTITY_DECIMALS {
            errors.push(ValidationError::PrecisionExceeded {
                field: QUANTITY_FIELD.to_string(),
                max: MAX_QUANTITY_DECIMALS,
                actual: digits,
            });
        }

        if !allows_decimals && digits > 0 {
            errors.push(ValidationError::DecimalNotAllowed {
                field: QUANTITY_FIELD.to_string(),
            });
        }

        errors
    }

    /// Validates a requested quantity against available stock, both as text.
    pub fn validate_stock(
        &self,
        requested: &str,
        available: &str,
        allows_decimals: bool,
    ) -> Vec<ValidationError> {
        let requested = parse_field(requested, REQUESTED_FIELD);
        let available = parse_field(available, AVAILABLE_FIELD);

        match (requested, available) {
            (Ok(requested), Ok(available)) => {
                self.validate_stock_amount(requested, available, allows_decimals)
            }
            (requested, available) => [requested.err(), available.err()]
                .into_iter()
                .flatten()
                .collect(),
        }
    }

    /// Stock check on parsed values. Reports the shortfall, formatted with
    /// the product's decimal display rule.
    pub fn validate_stock_amount(
        &self,
        requested: Decimal,
        available: Decimal,
        allows_decimals: bool,
    ) -> Vec<ValidationError> {
        if requested <= available {
            return Vec::new();
        }

        // Saturates when the gap exceeds the decimal range (deeply oversold stock).
        let shortfall = requested.checked_sub(available).unwrap_or(Decimal::MAX);
        let display = |value: Decimal| format_quantity(value, allows_decimals, &self.policy);
        vec![ValidationError::StockInsufficient {
            requested: display(requested),
            available: display(available),
            shortfall: display(shortfall),
        }]
    }
}

// =============================================================================
// Free Functions
// =============================================================================

/// [`QuantityValidator::validate_quantity_input`] with the default policy.
pub fn validate_quantity_input(raw: &str, allows_decimals: bool) -> Vec<ValidationError> {
    QuantityValidator::default().validate_quantity_input(raw, allows_decimals)
}

/// [`QuantityValidator::validate_stock`] with the default policy.
pub fn validate_stock(requested: &str, available: &str, allows_decimals: bool) -> Vec<ValidationError> {
    QuantityValidator::default().validate_stock(requested, available, allows_decimals)
}

// =============================================================================
// Unit Tests
// =============================================================================
