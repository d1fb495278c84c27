//! # medida-core: Unit-of-Measure Conversion Engine
//!
//! Converts quantities between measurement units, decides how a product's
//! quantities may be entered, and validates user input against those rules.
//! Sales, inventory movements and spreadsheet imports all go through here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Host Application                                  │
//! │   sales │ inventory movements │ excel import │ product screens          │
//! │                                │                                        │
//! │        unit rows, edge rows    │    quantities, verdicts                │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ medida-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ConversionService ─► graph ─► path (BFS) ─► factor             │   │
//! │  │         │                                                       │   │
//! │  │         ├─► product (auto-configuration rules)                  │   │
//! │  │         └─► validation (quantity + stock checks)                │   │
//! │  │                                                                 │   │
//! │  │   rounding • quantity parsing • config • errors                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Units, edges, scopes, product measurement config
//! - [`rounding`] - Rounding modes and the precision table
//! - [`quantity`] - Explicit quantity parsing and display
//! - [`graph`] - Per-tenant immutable conversion graph
//! - [`path`] - Shortest-route search and factor composition
//! - [`catalog`] - Unit and edge rows supplied by the host
//! - [`service`] - Conversion facade with a graph cache
//! - [`product`] - Product measurement auto-configuration
//! - [`validation`] - Quantity and stock validators
//! - [`config`] - Engine configuration (TOML + environment)
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use medida_core::{ConversionCatalog, ConversionService, EngineConfig};
//! use medida_core::types::*;
//! use rust_decimal::Decimal;
//!
//! let weight = |id, code: &str| UnitOfMeasure {
//!     id: UnitId(id),
//!     code: code.into(),
//!     name: code.into(),
//!     abbreviation: code.to_lowercase(),
//!     measurement_type: MeasurementType::Weight,
//!     allows_decimals_default: true,
//!     scope: Scope::Global,
//! };
//! let (lb, kg) = (UnitId(1), UnitId(2));
//! let catalog = ConversionCatalog::new(
//!     [weight(1, "LB"), weight(2, "KG")],
//!     [ConversionEdge::global(lb, kg, "0.453592".parse().unwrap())],
//! );
//!
//! let service = ConversionService::new(catalog, &EngineConfig::default());
//! let tenant = TenantId::new_v4();
//!
//! let kilos = service.convert(Decimal::from(10), lb, kg, tenant).unwrap();
//! assert_eq!(kilos.to_string(), "4.536");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod config;
pub mod error;
pub mod graph;
pub mod path;
pub mod product;
pub mod quantity;
pub mod rounding;
pub mod service;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::ConversionCatalog;
pub use config::EngineConfig;
pub use error::{CoreError, CoreResult, ValidationError};
pub use graph::{ConversionGraph, ConversionGraphBuilder, EdgePrecedence};
pub use path::{compose_factor, find_path, ConversionRoute};
pub use product::{Advisory, ProductAutoConfigurator, ProductConfiguration};
pub use rounding::{Precision, RoundingMode, RoundingPolicy};
pub use service::ConversionService;
pub use types::*;
pub use validation::{validate_quantity_input, validate_stock, QuantityValidator};
