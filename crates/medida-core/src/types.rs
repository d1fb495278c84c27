//! # Domain Types
//!
//! Plain data the engine consumes: units, conversion edges and a product's
//! measurement configuration.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────────┐  │
//! │  │ UnitOfMeasure   │   │ ConversionEdge  │   │ ProductMeasurement-  │  │
//! │  │  ─────────────  │   │  ─────────────  │   │ Config               │  │
//! │  │  id (UnitId)    │   │  origin  ───────┼──►│  base_unit_id        │  │
//! │  │  code "KG"      │   │  destination    │   │  default_sale_unit_id│  │
//! │  │  measurement    │   │  factor > 0     │   │  measurement_type    │  │
//! │  │  scope          │   │  scope, active  │   │  allows_decimals     │  │
//! │  └─────────────────┘   └─────────────────┘   └──────────────────────┘  │
//! │                                                                         │
//! │  Scope: Global (shared) │ Tenant(TenantId) (overlay)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are immutable once referenced; the host creates and edits them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Identifiers
// =============================================================================

/// Numeric unit identifier (database primary key).
///
/// Ordered: path search visits neighbours in ascending id order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct UnitId(pub i64);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// Tenant identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TenantId(#[ts(type = "string")] pub Uuid);

impl TenantId {
    /// Creates a random tenant id (tests and fixtures).
    pub fn new_v4() -> Self {
        TenantId(Uuid::new_v4())
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Scope
// =============================================================================

/// Whether a row is shared by every tenant or belongs to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case", tag = "kind", content = "tenant_id")]
pub enum Scope {
    #[default]
    Global,
    Tenant(TenantId),
}

impl Scope {
    /// Global rows are visible to everyone; tenant rows only to their owner.
    #[inline]
    pub fn is_visible_to(&self, tenant: TenantId) -> bool {
        match self {
            Scope::Global => true,
            Scope::Tenant(owner) => *owner == tenant,
        }
    }

    #[inline]
    pub fn is_tenant(&self) -> bool {
        matches!(self, Scope::Tenant(_))
    }
}

// =============================================================================
// Measurement Type
// =============================================================================

/// Category of a unit. Governs the decimal-quantity rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementType {
    Weight,
    Count,
    Volume,
    Length,
    Area,
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementType::Weight => write!(f, "weight"),
            MeasurementType::Count => write!(f, "count"),
            MeasurementType::Volume => write!(f, "volume"),
            MeasurementType::Length => write!(f, "length"),
            MeasurementType::Area => write!(f, "area"),
        }
    }
}

/// Maps the loosely-typed strings stored by older screens onto the enum.
///
/// This is the only place an unknown type can appear; past this boundary the
/// enum is closed.
impl FromStr for MeasurementType {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "weight" | "peso" => Ok(MeasurementType::Weight),
            "count" | "unit" | "unidad" => Ok(MeasurementType::Count),
            "volume" | "volumen" => Ok(MeasurementType::Volume),
            "length" | "longitud" => Ok(MeasurementType::Length),
            "area" | "superficie" => Ok(MeasurementType::Area),
            other => Err(CoreError::InvalidMeasurementType(other.to_string())),
        }
    }
}

// =============================================================================
// Unit of Measure
// =============================================================================

/// A measurement unit row (KG, LB, UN, M2, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UnitOfMeasure {
    pub id: UnitId,

    /// Short unique symbol ("KG").
    pub code: String,

    /// Display name ("Kilogramo").
    pub name: String,

    pub abbreviation: String,

    pub measurement_type: MeasurementType,

    /// Hint shown on the unit admin screen.
    #[serde(default)]
    pub allows_decimals_default: bool,

    #[serde(default)]
    pub scope: Scope,
}

// =============================================================================
// Conversion Edge
// =============================================================================

/// "1 `origin` = `factor` `destination`".
///
/// Only one direction is stored; the graph derives the inverse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConversionEdge {
    pub origin: UnitId,
    pub destination: UnitId,

    #[ts(type = "string")]
    pub factor: Decimal,

    #[serde(default)]
    pub scope: Scope,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl ConversionEdge {
    /// Active global edge.
    pub fn global(origin: UnitId, destination: UnitId, factor: Decimal) -> Self {
        ConversionEdge {
            origin,
            destination,
            factor,
            scope: Scope::Global,
            active: true,
        }
    }

    /// Active tenant overlay edge.
    pub fn for_tenant(
        tenant: TenantId,
        origin: UnitId,
        destination: UnitId,
        factor: Decimal,
    ) -> Self {
        ConversionEdge {
            origin,
            destination,
            factor,
            scope: Scope::Tenant(tenant),
            active: true,
        }
    }

    /// Checks the row before the host persists it.
    ///
    /// ## Example
    /// ```rust
    /// use medida_core::types::{ConversionEdge, UnitId};
    /// use rust_decimal::Decimal;
    ///
    /// let bad = ConversionEdge::global(UnitId(1), UnitId(2), Decimal::ZERO);
    /// assert!(bad.validate().is_err());
    /// ```
    pub fn validate(&self) -> CoreResult<()> {
        if self.factor <= Decimal::ZERO {
            return Err(CoreError::InvalidFactor {
                origin: self.origin,
                destination: self.destination,
                factor: self.factor,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Product Measurement
// =============================================================================

/// What the product screen submits. `None` means "not explicitly supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MeasurementRequest {
    #[serde(default)]
    pub default_sale_unit_id: Option<UnitId>,

    #[serde(default)]
    pub allows_decimals: Option<bool>,
}

/// Resolved measurement configuration stored with the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductMeasurementConfig {
    pub base_unit_id: UnitId,
    pub default_sale_unit_id: UnitId,
    /// Inherited from the base unit.
    pub measurement_type: MeasurementType,
    pub allows_decimals: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================
