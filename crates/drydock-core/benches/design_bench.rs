//! Criterion benchmarks for design construction and queries.
//!
//! Three benchmark groups:
//! - `construction`: validate + stat-cache for valid and invalid inputs
//! - `queries`: attack and cost estimates on a built design
//! - `registry`: checksum and snapshot round-trip for a populated registry

use criterion::{Criterion, criterion_group, criterion_main};
use drydock_core::combat::CombatEstimator;
use drydock_core::design::{DesignSpec, ShipDesign};
use drydock_core::production::CostTimeEvaluator;
use drydock_core::rules::GameRules;
use drydock_core::test_utils::*;
use drydock_core::universe::DesignRegistry;
use drydock_core::validation::Repair;

// ===========================================================================
// Builders
// ===========================================================================

/// A registry with `count` designs cycling through a few layouts.
fn build_registry(count: usize) -> DesignRegistry {
    let catalogs = fixture_catalogs();
    let layouts: [(&str, &[&str]); 4] = [
        (CRUISER, &[LASER, LASER, FUEL]),
        (CRUISER, &[BAY, ARMOUR, HANGAR]),
        (FRIGATE, &[DETECTOR, FUEL]),
        (STATION, &[DRYDOCK, LASER]),
    ];

    let mut registry = DesignRegistry::new();
    for i in 0..count {
        let (hull, parts) = layouts[i % layouts.len()];
        let design = make_design(&catalogs, &format!("Design {i}"), hull, parts);
        // Fresh identifiers never collide.
        let _ = registry.insert(design);
    }
    registry
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_construction(c: &mut Criterion) {
    let catalogs = fixture_catalogs();
    let mut group = c.benchmark_group("construction");

    let valid = DesignSpec::new("Raider", CRUISER, names(&[LASER, LASER, FUEL]));
    group.bench_function("valid_design", |b| {
        b.iter(|| ShipDesign::new(&catalogs, valid.clone(), Repair::Silent).unwrap());
    });

    let invalid = DesignSpec::new(
        "Wreck",
        "SH_MISSING",
        names(&[FUEL, CLOAK, DETECTOR, "PT_MISSING", LASER]),
    );
    group.bench_function("repaired_design", |b| {
        b.iter(|| ShipDesign::new(&catalogs, invalid.clone(), Repair::Silent).unwrap());
    });

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let catalogs = fixture_catalogs();
    let rules = GameRules::default();
    let design = make_design(&catalogs, "Mixed", CRUISER, &[BAY, LASER, HANGAR]);
    let mut group = c.benchmark_group("queries");

    let combat = CombatEstimator::new(&catalogs, &rules);
    group.bench_function("attack", |b| b.iter(|| combat.attack(&design)));

    let eval = CostTimeEvaluator::new(&catalogs, &rules);
    group.bench_function("design_cost", |b| {
        b.iter(|| eval.design_cost(&design, None, None))
    });

    group.finish();
}

fn bench_registry(c: &mut Criterion) {
    let catalogs = fixture_catalogs();
    let registry = build_registry(1000);
    let mut group = c.benchmark_group("registry");

    group.bench_function("checksum_1000_designs", |b| b.iter(|| registry.checksum()));

    let data = registry.serialize().unwrap();
    group.bench_function("serialize_1000_designs", |b| {
        b.iter(|| registry.serialize().unwrap())
    });
    group.bench_function("deserialize_1000_designs", |b| {
        b.iter(|| DesignRegistry::deserialize(&data, &catalogs).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_construction, bench_queries, bench_registry);
criterion_main!(benches);
