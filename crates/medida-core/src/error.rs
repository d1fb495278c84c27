//! # Error Types
//!
//! Domain-specific error types for medida-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  CoreError        - Conversion failures (returned as Err)              │
//! │  ├── UnitNotFound / PathNotFound                                       │
//! │  ├── InvalidFactor / FactorOverflow                                    │
//! │  └── InvalidMeasurementType / InvalidConfig                            │
//! │                                                                         │
//! │  ValidationError  - Quantity rule violations (returned as a list)      │
//! │  ├── MalformedQuantity / Required                                      │
//! │  ├── MustBePositive / PrecisionExceeded / DecimalNotAllowed            │
//! │  └── StockInsufficient                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Propagation
//! Conversion lookups never substitute a factor of 1 on failure: a missing
//! route is an `Err`. Validators never fail; they collect every violated rule
//! so the UI can show them all at once.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::UnitId;

// =============================================================================
// Core Error
// =============================================================================

/// Conversion engine errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A stored conversion factor is zero or negative.
    ///
    /// Data-integrity problem; should be caught when the edge row is created.
    #[error("Invalid conversion factor {factor} for {origin} -> {destination}: must be positive")]
    InvalidFactor {
        origin: UnitId,
        destination: UnitId,
        factor: Decimal,
    },

    /// Unit does not exist or is not visible to the tenant.
    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    /// Both units exist but no chain of edges connects them.
    ///
    /// ## When This Occurs
    /// - Converting between measurement types (KG -> M)
    /// - Tenant has not configured the bridging edge (CAJA -> UN)
    #[error("No conversion path from {origin} to {destination}")]
    PathNotFound { origin: UnitId, destination: UnitId },

    /// Composing a long path overflowed decimal range.
    #[error("Conversion factor overflow along path {path:?}")]
    FactorOverflow { path: Vec<UnitId> },

    /// Legacy measurement type string that maps to no known type.
    #[error("Unknown measurement type: '{0}'")]
    InvalidMeasurementType(String),

    /// Engine configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Quantity input violations.
///
/// The `Display` text of each variant is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Input was empty or whitespace.
    #[error("{field} is required")]
    Required { field: String },

    /// Input could not be read as a number.
    #[error("{field} is not a valid number: '{raw}'")]
    MalformedQuantity { field: String, raw: String },

    /// Value must be greater than zero.
    #[error("{field} must be greater than zero")]
    MustBePositive { field: String },

    /// More fractional digits than the quantity precision allows.
    #[error("{field} allows at most {max} decimal places (got {actual})")]
    PrecisionExceeded {
        field: String,
        max: u32,
        actual: u32,
    },

    /// Product only accepts whole quantities.
    #[error("{field} must be a whole number for this product")]
    DecimalNotAllowed { field: String },

    /// Requested more than is available.
    #[error("Insufficient stock: requested {requested}, available {available} (short by {shortfall})")]
    StockInsufficient {
        requested: String,
        available: String,
        shortfall: String,
    },
}

/// Renders a list of violations as user-facing messages, in order.
pub fn messages(errors: &[ValidationError]) -> Vec<String> {
    errors.iter().map(ToString::to_string).collect()
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
