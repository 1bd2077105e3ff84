//! Property-based tests for design validation, sameness and checksums.
//!
//! Uses proptest to generate arbitrary (hull, parts) inputs drawn from the
//! fixture catalogs plus unknown names, then verifies the validator's
//! guarantees hold.

use drydock_core::checksum::CheckSum;
use drydock_core::combat::CombatEstimator;
use drydock_core::design::{DesignSpec, ShipDesign};
use drydock_core::fixed::Fixed64;
use drydock_core::production::CostTimeEvaluator;
use drydock_core::registry::Catalogs;
use drydock_core::rules::GameRules;
use drydock_core::test_utils::*;
use drydock_core::validation::{Repair, Validation, repair_design, validate_design};
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

const ALL_HULLS: &[&str] = &[FRIGATE, CRUISER, STATION, "SH_UNKNOWN", ""];

const ALL_PARTS: &[&str] = &[
    LASER,
    ARMOUR,
    DETECTOR,
    CLOAK,
    COLONY_POD,
    SHIELD,
    HANGAR,
    BAY,
    TROOPS,
    FUEL,
    DRYDOCK,
    CAPITAL_PART,
    "",
    "",
    "PT_UNKNOWN",
];

fn arb_hull() -> impl Strategy<Value = String> {
    proptest::sample::select(ALL_HULLS).prop_map(str::to_string)
}

fn arb_parts(max_len: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(
        proptest::sample::select(ALL_PARTS).prop_map(str::to_string),
        0..=max_len,
    )
}

/// Validated pair: the input itself when valid, else the repaired copy.
fn validated(catalogs: &Catalogs, hull: &str, parts: &[String]) -> (String, Vec<String>) {
    match validate_design(catalogs, hull, parts, Repair::Silent).unwrap() {
        Validation::Valid => (hull.to_string(), parts.to_vec()),
        Validation::Repaired { hull, parts } => (hull, parts),
    }
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Re-validating a repaired design reports it valid.
    #[test]
    fn validation_is_idempotent(hull in arb_hull(), parts in arb_parts(6)) {
        let catalogs = fixture_catalogs();
        let (hull, parts) = validated(&catalogs, &hull, &parts);
        let again = validate_design(&catalogs, &hull, &parts, Repair::Strict);
        prop_assert!(matches!(again, Ok(Validation::Valid)), "{:?}", again);
    }

    /// Validated designs fit their hull, mount every part in a legal slot
    /// and hold no excluded pair.
    #[test]
    fn validated_designs_hold_invariants(hull in arb_hull(), parts in arb_parts(6)) {
        let catalogs = fixture_catalogs();
        let (hull_name, parts) = validated(&catalogs, &hull, &parts);
        let hull = catalogs.hulls.lookup(&hull_name).unwrap();

        prop_assert_eq!(parts.len(), hull.num_slots());

        let mut present: Vec<(&str, &std::collections::BTreeSet<String>)> =
            vec![(hull.name.as_str(), &hull.exclusions)];
        for (slot, name) in parts.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            let part = catalogs.parts.lookup(name);
            prop_assert!(part.is_some(), "unknown part {} survived", name);
            let part = part.unwrap();
            prop_assert!(part.can_mount_in_slot_type(hull.slots[slot].slot_type));
            present.push((part.name.as_str(), &part.exclusions));
        }

        // Distinct copies of one part count as a pair too.
        for (i, (a, a_excl)) in present.iter().enumerate() {
            for (j, (b, _)) in present.iter().enumerate() {
                if i != j {
                    prop_assert!(!a_excl.contains(*b), "{} and {} both present", a, b);
                }
            }
        }
    }

    /// A valid input comes back unchanged and without repair actions.
    #[test]
    fn valid_inputs_are_untouched(hull in arb_hull(), parts in arb_parts(6)) {
        let catalogs = fixture_catalogs();
        let (hull, parts) = validated(&catalogs, &hull, &parts);
        let report = repair_design(&catalogs, &hull, &parts);
        prop_assert!(report.is_valid());
        prop_assert_eq!(report.hull, hull);
        prop_assert_eq!(report.parts, parts);
    }

    /// Sameness is symmetric and ignores slot order.
    #[test]
    fn sameness_is_symmetric(
        hull_a in arb_hull(),
        parts_a in arb_parts(4),
        hull_b in arb_hull(),
        parts_b in arb_parts(4),
    ) {
        let catalogs = fixture_catalogs();
        let a = make_design(&catalogs, "A", &hull_a, &parts_a.iter().map(String::as_str).collect::<Vec<_>>());
        let b = make_design(&catalogs, "B", &hull_b, &parts_b.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert_eq!(a.same_design(&b), b.same_design(&a));

        let mut reversed = a.to_spec();
        reversed.parts.reverse();
        let reversed = make_design(
            &catalogs,
            "Reversed",
            &reversed.hull,
            &reversed.parts.iter().map(String::as_str).collect::<Vec<_>>(),
        );
        if reversed.parts().len() == a.parts().len() && reversed.hull() == a.hull() {
            let mut x: Vec<_> = a.mounted_parts().collect();
            let mut y: Vec<_> = reversed.mounted_parts().collect();
            x.sort();
            y.sort();
            prop_assert_eq!(x == y, a.same_design(&reversed));
        }
    }

    /// Building the same design twice yields the same checksum.
    #[test]
    fn checksum_is_deterministic(hull in arb_hull(), parts in arb_parts(6)) {
        let catalogs = fixture_catalogs();
        let build = || {
            let spec = DesignSpec::new("Probe", &hull, parts.clone());
            ShipDesign::new(&catalogs, spec, Repair::Silent).unwrap()
        };
        prop_assert_eq!(build().checksum(), build().checksum());
        prop_assert_eq!(catalogs.checksum(), fixture_catalogs().checksum());
    }

    /// Cost never goes negative, time is at least one turn, attack is never
    /// negative.
    #[test]
    fn queries_stay_in_range(hull in arb_hull(), parts in arb_parts(6), bouts in 0u32..8) {
        let catalogs = fixture_catalogs();
        let rules = GameRules { num_combat_rounds: bouts, ..GameRules::default() };
        let design = make_design(
            &catalogs,
            "Probe",
            &hull,
            &parts.iter().map(String::as_str).collect::<Vec<_>>(),
        );

        let eval = CostTimeEvaluator::new(&catalogs, &rules);
        prop_assert!(eval.design_cost(&design, None, None) >= Fixed64::ZERO);
        prop_assert!(eval.design_time(&design, None, None) >= 1);

        let combat = CombatEstimator::new(&catalogs, &rules);
        prop_assert!(combat.attack(&design) >= Fixed64::ZERO);
        prop_assert!(combat.attack(&design) >= combat.adjusted_attack(&design, fixed(5.0)));
    }
}
