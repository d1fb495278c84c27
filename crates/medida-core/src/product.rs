//! # Product Measurement Rules
//!
//! Decides, from the base unit's measurement type, whether a product accepts
//! decimal quantities and which unit it is sold in by default.
//!
//! ## Rules (applied in order)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  measurement_type   allows_decimals                                     │
//! │  ────────────────   ──────────────────────────────────────────────────  │
//! │  Weight             ALWAYS true (overrides an explicit false)           │
//! │  Count              explicit value, else false                          │
//! │                     + advisory if the unit is not UN/UND/UNIDAD         │
//! │  Volume/Length/Area explicit value, else true                           │
//! │                                                                         │
//! │  default_sale_unit  explicit value, else the base unit                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Advisories never block the configuration.

use serde::Serialize;
use std::fmt;
use tracing::info;
use ts_rs::TS;

use crate::config::EngineConfig;
use crate::types::{MeasurementRequest, MeasurementType, ProductMeasurementConfig, UnitOfMeasure};

/// Non-fatal note produced while configuring a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Advisory {
    /// Weight products always accept decimals; an explicit `false` was
    /// ignored.
    DecimalsForcedForWeight,

    /// Count product based on a unit other than the canonical one.
    NonCanonicalCountUnit { code: String, recommended: String },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::DecimalsForcedForWeight => {
                write!(f, "Weight products always allow decimal quantities")
            }
            Advisory::NonCanonicalCountUnit { code, recommended } => write!(
                f,
                "Unit '{}' is not a standard count unit; consider using '{}'",
                code, recommended
            ),
        }
    }
}

/// Result of [`ProductAutoConfigurator::configure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ProductConfiguration {
    pub config: ProductMeasurementConfig,
    pub advisories: Vec<Advisory>,
}

/// Applies the measurement business rules.
#[derive(Debug, Clone)]
pub struct ProductAutoConfigurator {
    canonical_count_codes: Vec<String>,
}

impl Default for ProductAutoConfigurator {
    fn default() -> Self {
        ProductAutoConfigurator::from_config(&EngineConfig::default())
    }
}

impl ProductAutoConfigurator {
    pub fn from_config(config: &EngineConfig) -> Self {
        ProductAutoConfigurator {
            canonical_count_codes: config
                .canonical_count_codes
                .iter()
                .map(|code| code.to_uppercase())
                .collect(),
        }
    }

    /// Configures a product whose stock is kept in `base_unit`.
    ///
    /// ## Example
    /// ```rust
    /// use medida_core::product::ProductAutoConfigurator;
    /// use medida_core::types::*;
    ///
    /// let kg = UnitOfMeasure {
    ///     id: UnitId(1),
    ///     code: "KG".into(),
    ///     name: "Kilogramo".into(),
    ///     abbreviation: "kg".into(),
    ///     measurement_type: MeasurementType::Weight,
    ///     allows_decimals_default: true,
    ///     scope: Scope::Global,
    /// };
    /// let request = MeasurementRequest { allows_decimals: Some(false), ..Default::default() };
    ///
    /// let result = ProductAutoConfigurator::default().configure(&kg, &request);
    /// assert!(result.config.allows_decimals);
    /// assert_eq!(result.config.default_sale_unit_id, UnitId(1));
    /// ```
    pub fn configure(
        &self,
        base_unit: &UnitOfMeasure,
        request: &MeasurementRequest,
    ) -> ProductConfiguration {
        let mut advisories = Vec::new();

        let allows_decimals = match base_unit.measurement_type {
            MeasurementType::Weight => {
                if request.allows_decimals == Some(false) {
                    advisories.push(Advisory::DecimalsForcedForWeight);
                }
                true
            }
            MeasurementType::Count => {
                if !self.is_canonical_count_code(&base_unit.code) {
                    advisories.push(Advisory::NonCanonicalCountUnit {
                        code: base_unit.code.clone(),
                        recommended: self.recommended_count_code().to_string(),
                    });
                }
                request.allows_decimals.unwrap_or(false)
            }
            MeasurementType::Volume | MeasurementType::Length | MeasurementType::Area => {
                request.allows_decimals.unwrap_or(true)
            }
        };

        for advisory in &advisories {
            info!(unit = %base_unit.code, %advisory, "Product measurement advisory");
        }

        ProductConfiguration {
            config: ProductMeasurementConfig {
                base_unit_id: base_unit.id,
                default_sale_unit_id: request.default_sale_unit_id.unwrap_or(base_unit.id),
                measurement_type: base_unit.measurement_type,
                allows_decimals,
            },
            advisories,
        }
    }

    pub fn is_canonical_count_code(&self, code: &str) -> bool {
        let code = code.trim().to_uppercase();
        self.canonical_count_codes.iter().any(|c| *c == code)
    }

    fn recommended_count_code(&self) -> &str {
        self.canonical_count_codes
            .first()
            .map(String::as_str)
            .unwrap_or("UN")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Scope, UnitId};

    fn unit(id: i64, code: &str, measurement_type: MeasurementType) -> UnitOfMeasure {
        UnitOfMeasure {
            id: UnitId(id),
            code: code.to_string(),
            name: code.to_string(),
            abbreviation: code.to_lowercase(),
            measurement_type,
            allows_decimals_default: false,
            scope: Scope::Global,
        }
    }

    fn request(allows_decimals: Option<bool>, sale_unit: Option<i64>) -> MeasurementRequest {
        MeasurementRequest {
            default_sale_unit_id: sale_unit.map(UnitId),
            allows_decimals,
        }
    }

    #[test]
    fn test_weight_forces_decimals() {
        let kg = unit(1, "KG", MeasurementType::Weight);
        let configurator = ProductAutoConfigurator::default();

        let forced = configurator.configure(&kg, &request(Some(false), None));
        assert!(forced.config.allows_decimals);
        assert_eq!(forced.advisories, vec![Advisory::DecimalsForcedForWeight]);

        let implicit = configurator.configure(&kg, &request(None, None));
        assert!(implicit.config.allows_decimals);
        assert!(implicit.advisories.is_empty());
    }

    #[test]
    fn test_count_defaults_to_whole_numbers() {
        let un = unit(2, "UN", MeasurementType::Count);
        let configurator = ProductAutoConfigurator::default();

        let result = configurator.configure(&un, &request(None, None));
        assert!(!result.config.allows_decimals);
        assert!(result.advisories.is_empty());

        let explicit = configurator.configure(&un, &request(Some(true), None));
        assert!(explicit.config.allows_decimals);
    }

    #[test]
    fn test_count_non_canonical_unit_is_advisory_only() {
        let caja = unit(3, "CAJA", MeasurementType::Count);
        let result = ProductAutoConfigurator::default().configure(&caja, &request(None, None));

        assert!(!result.config.allows_decimals);
        assert_eq!(
            result.advisories,
            vec![Advisory::NonCanonicalCountUnit {
                code: "CAJA".to_string(),
                recommended: "UN".to_string(),
            }]
        );
        assert_eq!(
            result.advisories[0].to_string(),
            "Unit 'CAJA' is not a standard count unit; consider using 'UN'"
        );
    }

    #[test]
    fn test_canonical_codes_case_insensitive() {
        let configurator = ProductAutoConfigurator::default();
        assert!(configurator.is_canonical_count_code("und"));
        assert!(configurator.is_canonical_count_code(" Unidad "));
        assert!(!configurator.is_canonical_count_code("PZA"));
    }

    #[test]
    fn test_continuous_types_default_to_decimals() {
        let configurator = ProductAutoConfigurator::default();
        for (id, code, kind) in [
            (4, "L", MeasurementType::Volume),
            (5, "M", MeasurementType::Length),
            (6, "M2", MeasurementType::Area),
        ] {
            let u = unit(id, code, kind);
            assert!(configurator.configure(&u, &request(None, None)).config.allows_decimals);
            assert!(!configurator.configure(&u, &request(Some(false), None)).config.allows_decimals);
        }
    }

    #[test]
    fn test_default_sale_unit() {
        let m = unit(5, "M", MeasurementType::Length);
        let configurator = ProductAutoConfigurator::default();

        let result = configurator.configure(&m, &request(None, None));
        assert_eq!(result.config.base_unit_id, UnitId(5));
        assert_eq!(result.config.default_sale_unit_id, UnitId(5));
        assert_eq!(result.config.measurement_type, MeasurementType::Length);

        let result = configurator.configure(&m, &request(None, Some(7)));
        assert_eq!(result.config.default_sale_unit_id, UnitId(7));
    }
}
