//! # Conversion Catalog
//!
//! The unit and edge rows the host application loaded from its store.
//!
//! The catalog is read-only. When rows change, the host builds a new catalog
//! and hands it to [`ConversionService::replace_catalog`].
//!
//! [`ConversionService::replace_catalog`]: crate::service::ConversionService::replace_catalog

use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};
use crate::graph::{visible_edges, EdgePrecedence};
use crate::types::{ConversionEdge, TenantId, UnitId, UnitOfMeasure};

/// Unit rows keyed by id plus edge rows in the order they were fetched.
#[derive(Debug, Clone, Default)]
pub struct ConversionCatalog {
    units: BTreeMap<UnitId, UnitOfMeasure>,
    edges: Vec<ConversionEdge>,
}

impl ConversionCatalog {
    /// Creates a catalog. A duplicate unit id keeps the later row.
    pub fn new(
        units: impl IntoIterator<Item = UnitOfMeasure>,
        edges: impl IntoIterator<Item = ConversionEdge>,
    ) -> Self {
        ConversionCatalog {
            units: units.into_iter().map(|unit| (unit.id, unit)).collect(),
            edges: edges.into_iter().collect(),
        }
    }

    /// Looks up a unit the tenant is allowed to see.
    pub fn unit_for_tenant(&self, id: UnitId, tenant: TenantId) -> CoreResult<&UnitOfMeasure> {
        self.units
            .get(&id)
            .filter(|unit| unit.scope.is_visible_to(tenant))
            .ok_or(CoreError::UnitNotFound(id))
    }

    /// Finds a unit by code, case-insensitively.
    ///
    /// A tenant unit shadows a global unit with the same code.
    pub fn find_by_code(&self, code: &str, tenant: TenantId) -> Option<&UnitOfMeasure> {
        let code = code.trim();
        let mut matches = self
            .units
            .values()
            .filter(|unit| unit.scope.is_visible_to(tenant))
            .filter(|unit| unit.code.eq_ignore_ascii_case(code));

        let first = matches.next()?;
        if first.scope.is_tenant() {
            return Some(first);
        }
        Some(matches.find(|unit| unit.scope.is_tenant()).unwrap_or(first))
    }

    /// Edge rows `tenant` converts with, ordered by `precedence`.
    pub fn visible_edges(
        &self,
        tenant: TenantId,
        precedence: EdgePrecedence,
    ) -> Vec<&ConversionEdge> {
        visible_edges(&self.edges, tenant, precedence)
    }

    /// All edge rows, in fetch order.
    pub fn edges(&self) -> &[ConversionEdge] {
        &self.edges
    }

    pub fn units(&self) -> impl Iterator<Item = &UnitOfMeasure> {
        self.units.values()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MeasurementType, Scope};
    use rust_decimal::Decimal;

    fn unit(id: i64, code: &str, scope: Scope) -> UnitOfMeasure {
        UnitOfMeasure {
            id: UnitId(id),
            code: code.to_string(),
            name: code.to_string(),
            abbreviation: code.to_lowercase(),
            measurement_type: MeasurementType::Count,
            allows_decimals_default: false,
            scope,
        }
    }

    #[test]
    fn test_unit_visibility() {
        let mine = TenantId::new_v4();
        let other = TenantId::new_v4();
        let catalog = ConversionCatalog::new(
            [unit(1, "UN", Scope::Global), unit(2, "CAJA", Scope::Tenant(mine))],
            Vec::<ConversionEdge>::new(),
        );

        assert_eq!(catalog.unit_for_tenant(UnitId(1), other).unwrap().code, "UN");
        assert_eq!(catalog.unit_for_tenant(UnitId(2), mine).unwrap().code, "CAJA");
        assert!(matches!(
            catalog.unit_for_tenant(UnitId(2), other),
            Err(CoreError::UnitNotFound(UnitId(2)))
        ));
        assert!(matches!(
            catalog.unit_for_tenant(UnitId(9), mine),
            Err(CoreError::UnitNotFound(UnitId(9)))
        ));
    }

    #[test]
    fn test_visible_edges_order() {
        let mine = TenantId::new_v4();
        let other = TenantId::new_v4();
        let mut retired = ConversionEdge::global(UnitId(1), UnitId(3), Decimal::from(6));
        retired.active = false;
        let catalog = ConversionCatalog::new(
            [unit(1, "UN", Scope::Global), unit(2, "CAJA", Scope::Tenant(mine))],
            vec![
                ConversionEdge::for_tenant(mine, UnitId(2), UnitId(1), Decimal::from(24)),
                ConversionEdge::global(UnitId(2), UnitId(1), Decimal::from(12)),
                retired,
            ],
        );

        let factors = |tenant, precedence| {
            catalog
                .visible_edges(tenant, precedence)
                .iter()
                .map(|edge| edge.factor)
                .collect::<Vec<_>>()
        };
        assert_eq!(
            factors(mine, EdgePrecedence::InputOrder),
            vec![Decimal::from(24), Decimal::from(12)]
        );
        assert_eq!(
            factors(mine, EdgePrecedence::TenantLast),
            vec![Decimal::from(12), Decimal::from(24)]
        );
        assert_eq!(factors(other, EdgePrecedence::TenantLast), vec![Decimal::from(12)]);
    }

    #[test]
    fn test_find_by_code_prefers_tenant_unit() {
        let mine = TenantId::new_v4();
        let other = TenantId::new_v4();
        let catalog = ConversionCatalog::new(
            [
                unit(1, "CAJA", Scope::Global),
                unit(2, "CAJA", Scope::Tenant(mine)),
                unit(3, "UN", Scope::Global),
            ],
            Vec::<ConversionEdge>::new(),
        );

        assert_eq!(catalog.find_by_code("caja", mine).unwrap().id, UnitId(2));
        assert_eq!(catalog.find_by_code("CAJA", other).unwrap().id, UnitId(1));
        assert_eq!(catalog.find_by_code(" un ", other).unwrap().id, UnitId(3));
        assert!(catalog.find_by_code("KG", mine).is_none());
        assert_eq!(catalog.unit_count(), 3);
    }
}
