//! # Path Search and Factor Composition
//!
//! Finds the fewest-hop route between two units and multiplies the factors
//! along it.
//!
//! ## Search Order
//! ```text
//!        KG ────── G ────── MG
//!         │                  │
//!         └──── LB ──── OZ ──┘
//!
//!  find_path(KG, MG):
//!    level 0: [KG]
//!    level 1: [KG,G] [KG,LB]          neighbours visited by ascending id
//!    level 2: [KG,G,MG] ← first hit, returned
//! ```
//!
//! Visited units are tracked by id, so cycles terminate. Among equal-length
//! routes the one reached through lower ids wins, which makes the result
//! reproducible.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::graph::ConversionGraph;
use crate::rounding::RoundingPolicy;
use crate::types::UnitId;

/// A resolved conversion: the units traversed and the composed factor.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ConversionRoute {
    pub path: Vec<UnitId>,
    #[ts(type = "string")]
    pub factor: Decimal,
}

impl ConversionRoute {
    /// Number of edges traversed (0 for same-unit).
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn is_direct(&self) -> bool {
        self.hops() == 1
    }
}

// =============================================================================
// Path Finder
// =============================================================================

/// Breadth-first search for the shortest route `origin -> destination`.
///
/// Returns `None` when the units are not transitively convertible.
///
/// ## Example
/// ```rust
/// use medida_core::graph::ConversionGraphBuilder;
/// use medida_core::path::find_path;
/// use medida_core::types::{ConversionEdge, TenantId, UnitId};
/// use rust_decimal::Decimal;
///
/// let (kg, g, mg) = (UnitId(1), UnitId(2), UnitId(3));
/// let edges = [
///     ConversionEdge::global(kg, g, Decimal::from(1000)),
///     ConversionEdge::global(g, mg, Decimal::from(1000)),
/// ];
/// let graph = ConversionGraphBuilder::default().build(&edges, TenantId::new_v4());
///
/// assert_eq!(find_path(&graph, kg, mg), Some(vec![kg, g, mg]));
/// ```
pub fn find_path(
    graph: &ConversionGraph,
    origin: UnitId,
    destination: UnitId,
) -> Option<Vec<UnitId>> {
    if origin == destination {
        return Some(vec![origin]);
    }
    if graph.has_edge(origin, destination) {
        return Some(vec![origin, destination]);
    }

    let mut visited: HashSet<UnitId> = HashSet::from([origin]);
    let mut queue: VecDeque<Vec<UnitId>> = VecDeque::from([vec![origin]]);

    while let Some(path) = queue.pop_front() {
        let Some(&last) = path.last() else {
            continue;
        };

        for next in graph.neighbors(last) {
            if !visited.insert(next) {
                continue;
            }
            let mut extended = path.clone();
            extended.push(next);
            if next == destination {
                return Some(extended);
            }
            queue.push_back(extended);
        }
    }

    None
}

// =============================================================================
// Factor Composer
// =============================================================================

/// Multiplies the edge factors along `path`, then rounds to factor precision.
///
/// A single-unit path has factor 1. The path must come from the same graph;
/// a missing hop is reported as `PathNotFound`.
pub fn compose_factor(
    graph: &ConversionGraph,
    path: &[UnitId],
    policy: &RoundingPolicy,
) -> CoreResult<Decimal> {
    let mut total = Decimal::ONE;

    for pair in path.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let factor = graph
            .factor(from, to)
            .ok_or(CoreError::PathNotFound {
                origin: from,
                destination: to,
            })?;
        total = total
            .checked_mul(factor)
            .ok_or_else(|| CoreError::FactorOverflow {
                path: path.to_vec(),
            })?;
    }

    Ok(policy.factor(total))
}

/// [`find_path`] followed by [`compose_factor`].
pub fn resolve_route(
    graph: &ConversionGraph,
    origin: UnitId,
    destination: UnitId,
    policy: &RoundingPolicy,
) -> CoreResult<Option<ConversionRoute>> {
    let Some(path) = find_path(graph, origin, destination) else {
        return Ok(None);
    };
    let factor = compose_factor(graph, &path, policy)?;
    Ok(Some(ConversionRoute { path, factor }))
}

// =============================================================================
// Unit Tests
// =============================================================================
