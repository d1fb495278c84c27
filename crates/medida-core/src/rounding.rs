//! # Rounding Module
//!
//! Decimal rounding under a configurable mode and a fixed precision table.
//!
//! ## Precision Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Kind               Decimals   Example                                  │
//! │  ─────────────────  ────────   ──────────────────────────────────────   │
//! │  Quantity           3          4.53592  → 4.536                         │
//! │  Price              2          10.995   → 11.00                         │
//! │  ConversionFactor   6          2.2046226 → 2.204623                     │
//! │  Percentage         2          8.255    → 8.26                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modes
//! ```text
//!   value   HalfUp  HalfDown  Ceiling  Floor  Truncate   (0 decimals)
//!    2.5      3        2         3       2       2
//!   -2.5     -3       -2        -2      -3      -2
//!    2.4      2        2         3       2       2
//! ```
//!
//! Rounding never fails. A non-finite input is treated as zero.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// Rounding Mode
// =============================================================================

/// How a value is brought to a given number of decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Half away from zero.
    #[default]
    HalfUp,
    /// Half toward zero.
    HalfDown,
    Ceiling,
    Floor,
    Truncate,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfDown => RoundingStrategy::MidpointTowardZero,
            RoundingMode::Ceiling => RoundingStrategy::ToPositiveInfinity,
            RoundingMode::Floor => RoundingStrategy::ToNegativeInfinity,
            RoundingMode::Truncate => RoundingStrategy::ToZero,
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundingMode::HalfUp => write!(f, "half_up"),
            RoundingMode::HalfDown => write!(f, "half_down"),
            RoundingMode::Ceiling => write!(f, "ceiling"),
            RoundingMode::Floor => write!(f, "floor"),
            RoundingMode::Truncate => write!(f, "truncate"),
        }
    }
}

impl FromStr for RoundingMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "half_up" => Ok(RoundingMode::HalfUp),
            "half_down" => Ok(RoundingMode::HalfDown),
            "ceiling" | "ceil" => Ok(RoundingMode::Ceiling),
            "floor" => Ok(RoundingMode::Floor),
            "truncate" | "trunc" => Ok(RoundingMode::Truncate),
            other => Err(CoreError::InvalidConfig(format!(
                "Unknown rounding mode: '{}'. Valid options: half_up, half_down, ceiling, floor, truncate",
                other
            ))),
        }
    }
}

// =============================================================================
// Precision Table
// =============================================================================

/// Quantity kinds with a fixed number of decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    Quantity,
    Price,
    ConversionFactor,
    Percentage,
}

impl Precision {
    #[inline]
    pub const fn decimals(self) -> u32 {
        match self {
            Precision::Quantity => 3,
            Precision::Price => 2,
            Precision::ConversionFactor => 6,
            Precision::Percentage => 2,
        }
    }
}

// =============================================================================
// Free Function
// =============================================================================

/// Rounds `value` to `decimals` places under `mode`.
///
/// ## Example
/// ```rust
/// use medida_core::rounding::{round, RoundingMode};
/// use rust_decimal::Decimal;
///
/// let v: Decimal = "4.53592".parse().unwrap();
/// assert_eq!(round(v, 3, RoundingMode::HalfUp).to_string(), "4.536");
/// assert_eq!(round(v, 3, RoundingMode::Truncate).to_string(), "4.535");
/// ```
#[inline]
pub fn round(value: Decimal, decimals: u32, mode: RoundingMode) -> Decimal {
    value.round_dp_with_strategy(decimals, mode.strategy())
}

// =============================================================================
// Rounding Policy
// =============================================================================

/// A rounding mode plus the precision table.
///
/// Copy type; the service and validators hold one each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundingPolicy {
    mode: RoundingMode,
}

impl RoundingPolicy {
    pub const fn new(mode: RoundingMode) -> Self {
        RoundingPolicy { mode }
    }

    #[inline]
    pub const fn mode(&self) -> RoundingMode {
        self.mode
    }

    #[inline]
    pub fn round(&self, value: Decimal, decimals: u32) -> Decimal {
        round(value, decimals, self.mode)
    }

    /// Rounds a raw float coming from a loosely-typed boundary.
    ///
    /// NaN and infinities become zero.
    pub fn round_f64(&self, value: f64, decimals: u32) -> Decimal {
        let value = if value.is_finite() {
            Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };
        self.round(value, decimals)
    }

    #[inline]
    pub fn round_to(&self, value: Decimal, precision: Precision) -> Decimal {
        self.round(value, precision.decimals())
    }

    #[inline]
    pub fn quantity(&self, value: Decimal) -> Decimal {
        self.round_to(value, Precision::Quantity)
    }

    #[inline]
    pub fn price(&self, value: Decimal) -> Decimal {
        self.round_to(value, Precision::Price)
    }

    #[inline]
    pub fn factor(&self, value: Decimal) -> Decimal {
        self.round_to(value, Precision::ConversionFactor)
    }

    #[inline]
    pub fn percentage(&self, value: Decimal) -> Decimal {
        self.round_to(value, Precision::Percentage)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
