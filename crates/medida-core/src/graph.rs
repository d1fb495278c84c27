//! # Conversion Graph
//!
//! Builds a per-tenant, immutable adjacency map from flat edge rows.
//!
//! ## Symmetric Closure
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Stored row:      LB ──0.453592──► KG                                   │
//! │                                                                         │
//! │  Built graph:     LB ──0.453592──► KG                                   │
//! │                   KG ──2.2046226…─► LB   (1 / factor, full precision)   │
//! │                                                                         │
//! │  Same-unit conversion is implicit (factor 1) and never stored.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Visibility
//! A tenant's graph contains every active edge that is global or scoped to
//! that tenant. When two rows define the same unordered pair, the row
//! processed later overwrites the earlier one. [`EdgePrecedence`] chooses the
//! processing order.
//!
//! A built graph is never mutated. Rebuild and swap instead.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::types::{ConversionEdge, TenantId, UnitId};

// =============================================================================
// Edge Precedence
// =============================================================================

/// Processing order for rows that define the same unit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePrecedence {
    /// Rows are processed exactly as supplied; the last one wins.
    #[default]
    InputOrder,

    /// Global rows first, then tenant rows (each group keeps input order),
    /// so a tenant overlay wins over a global definition.
    TenantLast,
}

impl fmt::Display for EdgePrecedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgePrecedence::InputOrder => write!(f, "input_order"),
            EdgePrecedence::TenantLast => write!(f, "tenant_last"),
        }
    }
}

impl FromStr for EdgePrecedence {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "input_order" | "last_wins" => Ok(EdgePrecedence::InputOrder),
            "tenant_last" | "tenant_wins" => Ok(EdgePrecedence::TenantLast),
            other => Err(CoreError::InvalidConfig(format!(
                "Unknown edge precedence: '{}'. Valid options: input_order, tenant_last",
                other
            ))),
        }
    }
}

// =============================================================================
// Conversion Graph
// =============================================================================

/// Immutable adjacency snapshot: `unit -> neighbour -> factor`.
///
/// `BTreeMap` keeps neighbours in ascending id order, which is the order
/// path search must visit them in.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionGraph {
    tenant: TenantId,
    adjacency: BTreeMap<UnitId, BTreeMap<UnitId, Decimal>>,
}

impl ConversionGraph {
    pub fn tenant(&self) -> TenantId {
        self.tenant
    }

    /// Direct factor `origin -> destination`, if an edge (or its inverse)
    /// was loaded.
    #[inline]
    pub fn factor(&self, origin: UnitId, destination: UnitId) -> Option<Decimal> {
        self.adjacency
            .get(&origin)
            .and_then(|row| row.get(&destination))
            .copied()
    }

    #[inline]
    pub fn has_edge(&self, origin: UnitId, destination: UnitId) -> bool {
        self.factor(origin, destination).is_some()
    }

    /// Neighbours of `unit`, ascending by id.
    pub fn neighbors(&self, unit: UnitId) -> impl Iterator<Item = UnitId> + '_ {
        self.adjacency
            .get(&unit)
            .into_iter()
            .flat_map(|row| row.keys().copied())
    }

    pub fn contains(&self, unit: UnitId) -> bool {
        self.adjacency.contains_key(&unit)
    }

    pub fn unit_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Directed entries, inverses included.
    pub fn directed_edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Active rows `tenant` can see, in the order the builder applies them.
/// A later row overwrites an earlier one for the same pair.
pub fn visible_edges(
    edges: &[ConversionEdge],
    tenant: TenantId,
    precedence: EdgePrecedence,
) -> Vec<&ConversionEdge> {
    let visible = edges
        .iter()
        .filter(|edge| edge.active && edge.scope.is_visible_to(tenant));

    match precedence {
        EdgePrecedence::InputOrder => visible.collect(),
        EdgePrecedence::TenantLast => {
            let (tenant_rows, global_rows): (Vec<_>, Vec<_>) =
                visible.partition(|edge| edge.scope.is_tenant());
            global_rows.into_iter().chain(tenant_rows).collect()
        }
    }
}

/// Turns edge rows into a [`ConversionGraph`]. O(E).
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionGraphBuilder {
    precedence: EdgePrecedence,
}

impl ConversionGraphBuilder {
    pub fn new(precedence: EdgePrecedence) -> Self {
        ConversionGraphBuilder { precedence }
    }

    /// Builds the graph `tenant` sees.
    ///
    /// Rows that are inactive or belong to another tenant are ignored. Rows
    /// with a non-positive factor or the same unit on both ends are skipped
    /// with a warning.
    pub fn build(&self, edges: &[ConversionEdge], tenant: TenantId) -> ConversionGraph {
        let ordered = visible_edges(edges, tenant, self.precedence);

        let mut adjacency: BTreeMap<UnitId, BTreeMap<UnitId, Decimal>> = BTreeMap::new();
        let mut loaded = 0usize;

        for edge in ordered {
            if edge.origin == edge.destination {
                warn!(unit = %edge.origin, "Skipping self-referencing conversion edge");
                continue;
            }
            if let Err(err) = edge.validate() {
                warn!(error = %err, "Skipping conversion edge");
                continue;
            }
            let inverse = Decimal::ONE / edge.factor;

            adjacency
                .entry(edge.origin)
                .or_default()
                .insert(edge.destination, edge.factor);
            adjacency
                .entry(edge.destination)
                .or_default()
                .insert(edge.origin, inverse);
            loaded += 1;
        }

        debug!(
            %tenant,
            rows = loaded,
            units = adjacency.len(),
            precedence = %self.precedence,
            "Built conversion graph"
        );

        ConversionGraph { tenant, adjacency }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
