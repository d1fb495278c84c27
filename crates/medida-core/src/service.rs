//! # Conversion Service
//!
//! Public facade over graph building, path search and factor composition,
//! with a tenant-keyed cache of immutable graphs.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  convert(10, LB, KG, tenant)                                           │
//! │       │                                                                 │
//! │       ├── quantity <= 0?            → 0                                │
//! │       ├── units visible to tenant?  → else UnitNotFound                │
//! │       ├── same unit?                → factor 1                         │
//! │       ├── graph_for(tenant)         → cached Arc<ConversionGraph>      │
//! │       ├── find_path + compose       → else PathNotFound                │
//! │       └── round(10 × 0.453592, 3)   → 4.536                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! Graphs are shared as `Arc` snapshots and never mutated. Refreshing the
//! cache or the catalog replaces the `Arc`; a reader that already holds a
//! snapshot keeps traversing it undisturbed. The locks guard only the
//! pointer swap, never a traversal.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

use crate::catalog::ConversionCatalog;
use crate::config::EngineConfig;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::graph::{ConversionGraph, ConversionGraphBuilder};
use crate::path::{resolve_route, ConversionRoute};
use crate::product::{ProductAutoConfigurator, ProductConfiguration};
use crate::quantity::parse_quantity;
use crate::rounding::RoundingPolicy;
use crate::types::{MeasurementRequest, ProductMeasurementConfig, TenantId, UnitId};
use crate::validation::QuantityValidator;

/// Conversion facade. Share it behind an `Arc` between request handlers.
#[derive(Debug)]
pub struct ConversionService {
    catalog: RwLock<Arc<ConversionCatalog>>,
    graphs: RwLock<HashMap<TenantId, Arc<ConversionGraph>>>,
    builder: ConversionGraphBuilder,
    policy: RoundingPolicy,
    cache_enabled: bool,
    configurator: ProductAutoConfigurator,
    validator: QuantityValidator,
}

impl ConversionService {
    pub fn new(catalog: ConversionCatalog, config: &EngineConfig) -> Self {
        let policy = config.rounding_policy();
        ConversionService {
            catalog: RwLock::new(Arc::new(catalog)),
            graphs: RwLock::new(HashMap::new()),
            builder: ConversionGraphBuilder::new(config.edge_precedence),
            policy,
            cache_enabled: config.graph_cache,
            configurator: ProductAutoConfigurator::from_config(config),
            validator: QuantityValidator::new(policy),
        }
    }

    pub fn policy(&self) -> RoundingPolicy {
        self.policy
    }

    /// Current catalog snapshot.
    pub fn catalog(&self) -> Arc<ConversionCatalog> {
        Arc::clone(&*self.catalog.read().unwrap_or_else(PoisonError::into_inner))
    }

    // =========================================================================
    // Graph Cache
    // =========================================================================

    /// The graph `tenant` converts against. Built on first use when caching
    /// is enabled, on every call otherwise.
    pub fn graph_for(&self, tenant: TenantId) -> Arc<ConversionGraph> {
        if self.cache_enabled {
            let cached = self
                .graphs
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&tenant)
                .cloned();
            if let Some(graph) = cached {
                debug!(%tenant, "Conversion graph cache hit");
                return graph;
            }
        }

        let catalog = self.catalog();
        let graph = Arc::new(self.builder.build(catalog.edges(), tenant));

        if self.cache_enabled {
            debug!(%tenant, "Conversion graph cache miss, storing snapshot");
            let mut graphs = self.graphs.write().unwrap_or_else(PoisonError::into_inner);
            // A snapshot of a catalog replaced meanwhile must not be cached.
            if Arc::ptr_eq(&catalog, &self.catalog()) {
                graphs.insert(tenant, Arc::clone(&graph));
            }
        }

        graph
    }

    /// Drops the cached graph of one tenant (its overlay rows changed).
    pub fn invalidate_tenant(&self, tenant: TenantId) {
        let removed = self
            .graphs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&tenant)
            .is_some();
        info!(%tenant, removed, "Invalidated conversion graph");
    }

    /// Drops every cached graph (global rows changed).
    pub fn invalidate_all(&self) {
        let mut graphs = self.graphs.write().unwrap_or_else(PoisonError::into_inner);
        let count = graphs.len();
        graphs.clear();
        info!(count, "Invalidated all conversion graphs");
    }

    /// Installs freshly loaded rows and drops every cached graph.
    pub fn replace_catalog(&self, catalog: ConversionCatalog) {
        let units = catalog.unit_count();
        let edges = catalog.edges().len();
        *self.catalog.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(catalog);
        self.invalidate_all();
        info!(units, edges, "Replaced conversion catalog");
    }

    // =========================================================================
    // Conversions
    // =========================================================================

    /// Route and factor from `origin` to `destination`.
    ///
    /// `Ok(None)` when both units exist but are not convertible.
    pub fn find_route(
        &self,
        origin: UnitId,
        destination: UnitId,
        tenant: TenantId,
    ) -> CoreResult<Option<ConversionRoute>> {
        self.ensure_units(&[origin, destination], tenant)?;

        if origin == destination {
            return Ok(Some(ConversionRoute {
                path: vec![origin],
                factor: Decimal::ONE,
            }));
        }

        let graph = self.graph_for(tenant);
        resolve_route(&graph, origin, destination, &self.policy)
    }

    /// Factor such that 1 `origin` = factor `destination`.
    pub fn get_factor(
        &self,
        origin: UnitId,
        destination: UnitId,
        tenant: TenantId,
    ) -> CoreResult<Option<Decimal>> {
        Ok(self
            .find_route(origin, destination, tenant)?
            .map(|route| route.factor))
    }

    /// Like [`get_factor`](Self::get_factor) but a missing route is an error.
    pub fn require_factor(
        &self,
        origin: UnitId,
        destination: UnitId,
        tenant: TenantId,
    ) -> CoreResult<Decimal> {
        self.get_factor(origin, destination, tenant)?
            .ok_or(CoreError::PathNotFound {
                origin,
                destination,
            })
    }

    /// Converts `quantity` and rounds to quantity precision.
    ///
    /// Non-positive quantities convert to zero without any lookup.
    pub fn convert(
        &self,
        quantity: Decimal,
        origin: UnitId,
        destination: UnitId,
        tenant: TenantId,
    ) -> CoreResult<Decimal> {
        if quantity <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }

        let factor = self.require_factor(origin, destination, tenant)?;
        let converted = quantity
            .checked_mul(factor)
            .ok_or_else(|| CoreError::FactorOverflow {
                path: vec![origin, destination],
            })?;
        Ok(self.policy.quantity(converted))
    }

    /// Normalizes a quantity entered in `input_unit` to the product's base
    /// unit before it is stored (stock movements, sale lines).
    pub fn convert_to_base_unit(
        &self,
        quantity: Decimal,
        input_unit: UnitId,
        base_unit: UnitId,
        tenant: TenantId,
    ) -> CoreResult<Decimal> {
        self.convert(quantity, input_unit, base_unit, tenant)
    }

    // =========================================================================
    // Products and Validation
    // =========================================================================

    /// Resolves the base unit and applies the product measurement rules.
    ///
    /// An explicit default sale unit must exist and be convertible to the
    /// base unit.
    pub fn configure_product(
        &self,
        base_unit_id: UnitId,
        request: &MeasurementRequest,
        tenant: TenantId,
    ) -> CoreResult<ProductConfiguration> {
        let catalog = self.catalog();
        let base_unit = catalog.unit_for_tenant(base_unit_id, tenant)?;

        if let Some(sale_unit) = request.default_sale_unit_id {
            self.require_factor(sale_unit, base_unit_id, tenant)?;
        }

        Ok(self.configurator.configure(base_unit, request))
    }

    /// Validates a quantity typed in `input_unit` for a sale or movement.
    ///
    /// Input rules are checked against the product's decimal policy; a valid
    /// input is then converted to the base unit and checked against
    /// `available_in_base`. Conversion failures are `Err`; rule violations
    /// are the returned list.
    pub fn validate_sale_quantity(
        &self,
        raw: &str,
        input_unit: UnitId,
        product: &ProductMeasurementConfig,
        available_in_base: Decimal,
        tenant: TenantId,
    ) -> CoreResult<Vec<ValidationError>> {
        let errors = self
            .validator
            .validate_quantity_input(raw, product.allows_decimals);
        if !errors.is_empty() {
            return Ok(errors);
        }

        let quantity = parse_quantity(raw)?;
        let in_base =
            self.convert_to_base_unit(quantity, input_unit, product.base_unit_id, tenant)?;

        Ok(self
            .validator
            .validate_stock_amount(in_base, available_in_base, product.allows_decimals))
    }

    fn ensure_units(&self, units: &[UnitId], tenant: TenantId) -> CoreResult<()> {
        let catalog = self.catalog();
        for unit in units {
            catalog.unit_for_tenant(*unit, tenant)?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
