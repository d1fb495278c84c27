//! Conversion Property Tests
//!
//! Properties that must hold for any unit set, edge set and quantity.

use medida_core::graph::ConversionGraphBuilder;
use medida_core::path::find_path;
use medida_core::rounding::{round, RoundingMode};
use medida_core::types::*;
use medida_core::{ConversionCatalog, ConversionService, EngineConfig};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;

const A: UnitId = UnitId(1);
const B: UnitId = UnitId(2);
const C: UnitId = UnitId(3);

fn unit(id: UnitId) -> UnitOfMeasure {
    UnitOfMeasure {
        id,
        code: format!("U{}", id.0),
        name: format!("Unit {}", id.0),
        abbreviation: format!("u{}", id.0),
        measurement_type: MeasurementType::Volume,
        allows_decimals_default: true,
        scope: Scope::Global,
    }
}

fn service(edges: Vec<ConversionEdge>) -> ConversionService {
    let catalog = ConversionCatalog::new([A, B, C].map(unit), edges);
    ConversionService::new(catalog, &EngineConfig::default())
}

/// Positive quantity with at most 3 decimals, up to 100.
fn quantity() -> impl Strategy<Value = Decimal> {
    (1i64..=100_000).prop_map(|millis| Decimal::new(millis, 3))
}

/// Arbitrary positive value with up to 8 decimals.
fn any_positive() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000_000_000).prop_map(|n| Decimal::new(n, 8))
}

/// Positive factor with up to 6 decimals.
fn factor() -> impl Strategy<Value = Decimal> {
    (1i64..=5_000_000_000).prop_map(|n| Decimal::new(n, 6))
}

/// Factors found in real catalogs, each >= 1 in the stored direction.
fn catalog_factor() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        Just(dec!(1000)),     // KG -> G
        Just(dec!(16)),       // LB -> OZ
        Just(dec!(12)),       // DOCENA -> UN
        Just(dec!(100)),      // M -> CM
        Just(dec!(2.54)),     // IN -> CM
        Just(dec!(3.785412)), // GAL -> L
        Just(dec!(2.204623)), // KG -> LB
    ]
}

proptest! {
    #[test]
    fn same_unit_conversion_only_rounds(q in any_positive()) {
        let tenant = TenantId::new_v4();
        let service = service(vec![]);
        prop_assert_eq!(
            service.convert(q, A, A, tenant).unwrap(),
            round(q, 3, RoundingMode::HalfUp)
        );
    }

    #[test]
    fn stored_edge_and_inverse(f in factor()) {
        let tenant = TenantId::new_v4();
        let service = service(vec![ConversionEdge::global(A, B, f)]);

        prop_assert_eq!(
            service.get_factor(A, B, tenant).unwrap(),
            Some(round(f, 6, RoundingMode::HalfUp))
        );
        prop_assert_eq!(
            service.get_factor(B, A, tenant).unwrap(),
            Some(round(Decimal::ONE / f, 6, RoundingMode::HalfUp))
        );
    }

    #[test]
    fn two_hop_composition(f1 in factor(), f2 in factor()) {
        let tenant = TenantId::new_v4();
        let service = service(vec![
            ConversionEdge::global(A, B, f1),
            ConversionEdge::global(B, C, f2),
        ]);
        prop_assert_eq!(
            service.get_factor(A, C, tenant).unwrap(),
            Some(round(f1 * f2, 6, RoundingMode::HalfUp))
        );
    }

    #[test]
    fn disconnected_units_have_no_factor(f in factor()) {
        let tenant = TenantId::new_v4();
        let service = service(vec![ConversionEdge::global(A, B, f)]);
        prop_assert_eq!(service.get_factor(A, C, tenant).unwrap(), None);
        prop_assert!(service.convert(dec!(1), C, B, tenant).is_err());
    }

    #[test]
    fn round_trip_within_one_thousandth(q in quantity(), f in catalog_factor()) {
        let tenant = TenantId::new_v4();
        let service = service(vec![ConversionEdge::global(A, B, f)]);

        let there = service.convert(q, A, B, tenant).unwrap();
        let back = service.convert(there, B, A, tenant).unwrap();
        prop_assert!((back - q).abs() <= dec!(0.001), "q={} there={} back={}", q, there, back);
    }

    #[test]
    fn rounding_stays_within_one_step(v in any_positive(), d in 0u32..=6) {
        let step = Decimal::new(1, d);
        for mode in [
            RoundingMode::HalfUp,
            RoundingMode::HalfDown,
            RoundingMode::Ceiling,
            RoundingMode::Floor,
            RoundingMode::Truncate,
        ] {
            let r = round(v, d, mode);
            prop_assert!(r.normalize().scale() <= d);
            prop_assert!((r - v).abs() < step);
        }
        prop_assert!(round(v, d, RoundingMode::Floor) <= v);
        prop_assert!(round(v, d, RoundingMode::Ceiling) >= v);
    }

    #[test]
    fn path_is_valid_and_order_independent(
        pairs in prop::collection::vec((1i64..=12, 1i64..=12), 0..30),
        origin in 1i64..=12,
        destination in 1i64..=12,
    ) {
        let tenant = TenantId::new_v4();
        let edges: Vec<ConversionEdge> = pairs
            .iter()
            .map(|&(a, b)| ConversionEdge::global(UnitId(a), UnitId(b), dec!(2)))
            .collect();
        let mut reversed = edges.clone();
        reversed.reverse();

        let builder = ConversionGraphBuilder::default();
        let graph = builder.build(&edges, tenant);
        let (origin, destination) = (UnitId(origin), UnitId(destination));

        let path = find_path(&graph, origin, destination);
        prop_assert_eq!(&path, &find_path(&builder.build(&reversed, tenant), origin, destination));

        if let Some(path) = path {
            prop_assert_eq!(path.first(), Some(&origin));
            prop_assert_eq!(path.last(), Some(&destination));
            let distinct: HashSet<_> = path.iter().collect();
            prop_assert_eq!(distinct.len(), path.len());
            for pair in path.windows(2) {
                prop_assert!(graph.has_edge(pair[0], pair[1]));
            }
            if graph.has_edge(origin, destination) {
                prop_assert_eq!(path.len(), 2);
            }
        }
    }
}
