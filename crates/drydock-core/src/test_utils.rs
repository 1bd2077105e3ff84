//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::condition::Condition;
use crate::design::{DesignSpec, ShipDesign};
use crate::expr::{BinaryOp, ValueExpr};
use crate::fixed::Fixed64;
use crate::registry::*;
use crate::validation::Repair;

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ===========================================================================
// Content names
// ===========================================================================

/// `[External, Internal]`. First hull in load order.
pub const FRIGATE: &str = "SH_FRIGATE";
/// `[External, External, Internal]`, excludes the colony pod.
pub const CRUISER: &str = "SH_CRUISER";
/// `[Core, External]`, cost depends on the production location.
pub const STATION: &str = "SH_STATION";

pub const LASER: &str = "SR_LASER";
pub const ARMOUR: &str = "AR_ZORTRIUM";
pub const DETECTOR: &str = "DT_RADAR";
/// Excludes the detector (one-sided).
pub const CLOAK: &str = "ST_CLOAK";
pub const COLONY_POD: &str = "CO_POD";
/// Lists itself as an exclusion.
pub const SHIELD: &str = "SH_DEFENSE_GRID";
pub const HANGAR: &str = "FT_HANGAR";
pub const BAY: &str = "FT_BAY";
pub const TROOPS: &str = "GT_TROOPS";
pub const FUEL: &str = "FU_TANK";
pub const DRYDOCK: &str = "CORE_DRYDOCK";
/// Cost scales with the producing empire's source object.
pub const CAPITAL_PART: &str = "SP_CAPITAL_LINK";

// ===========================================================================
// Definitions
// ===========================================================================

fn part(name: &str, class: PartClass, capacity: f64, slots: &[SlotType]) -> PartDef {
    let mut p = PartDef::new(name, class, fixed(capacity));
    p.mountable_slot_types = slots.iter().copied().collect();
    p
}

fn hull(name: &str, slots: &[SlotType]) -> HullDef {
    HullDef::new(name, slots.iter().copied().map(Slot::new).collect())
}

pub fn fixture_parts() -> Vec<PartDef> {
    use SlotType::*;

    let mut laser = part(LASER, PartClass::DirectWeapon, 15.0, &[External]);
    laser.secondary_stat = fixed(3.0);
    laser.production_cost = ValueExpr::constant(10.0);
    laser.production_time = ValueExpr::constant(2.0);

    let mut armour = part(ARMOUR, PartClass::Armour, 24.0, &[External]);
    armour.production_cost = ValueExpr::constant(8.0);
    armour.production_time = ValueExpr::constant(3.0);

    let detector = part(DETECTOR, PartClass::Detection, 25.0, &[External, Internal]);

    let mut cloak = part(CLOAK, PartClass::Stealth, 20.0, &[External, Internal]);
    cloak.exclusions.insert(DETECTOR.to_string());

    let mut colony = part(COLONY_POD, PartClass::Colony, 1.0, &[External, Internal]);
    colony.production_cost = ValueExpr::constant(40.0);
    colony.production_time = ValueExpr::constant(5.0);

    let mut shield = part(SHIELD, PartClass::Shield, 4.0, &[Internal, External]);
    shield.exclusions.insert(SHIELD.to_string());

    let hangar = part(HANGAR, PartClass::FighterHangar, 3.0, &[Internal, External]);

    let mut bay = part(BAY, PartClass::FighterBay, 2.0, &[External]);
    bay.secondary_stat = fixed(6.0);

    let troops = part(TROOPS, PartClass::Troops, 2.0, &[External, Internal]);
    let fuel = part(FUEL, PartClass::Fuel, 1.5, &[Internal]);

    let mut drydock = part(DRYDOCK, PartClass::ProductionLocation, 0.0, &[Core]);
    drydock.producible = false;

    let mut capital = part(CAPITAL_PART, PartClass::General, 0.0, &[Internal]);
    capital.production_cost = ValueExpr::binary(
        BinaryOp::Mul,
        ValueExpr::source("population"),
        ValueExpr::constant(0.5),
    );
    capital.location = Condition::OwnedBySource;

    vec![
        laser, armour, detector, cloak, colony, shield, hangar, bay, troops, fuel, drydock,
        capital,
    ]
}

pub fn fixture_hulls() -> Vec<HullDef> {
    use SlotType::*;

    let mut frigate = hull(FRIGATE, &[External, Internal]);
    frigate.structure = fixed(10.0);
    frigate.speed = fixed(75.0);
    frigate.fuel = fixed(5.0);
    frigate.stealth = fixed(5.0);
    frigate.production_cost = ValueExpr::constant(12.0);
    frigate.production_time = ValueExpr::constant(2.0);

    let mut cruiser = hull(CRUISER, &[External, External, Internal]);
    cruiser.structure = fixed(30.0);
    cruiser.speed = fixed(60.0);
    cruiser.fuel = fixed(3.0);
    cruiser.stealth = fixed(5.0);
    cruiser.production_cost = ValueExpr::constant(20.0);
    cruiser.production_time = ValueExpr::constant(4.0);
    cruiser.exclusions.insert(COLONY_POD.to_string());

    let mut station = hull(STATION, &[Core, External]);
    station.structure = fixed(100.0);
    station.production_cost = ValueExpr::binary(
        BinaryOp::Add,
        ValueExpr::constant(50.0),
        ValueExpr::target("supply"),
    );
    station.production_time = ValueExpr::constant(6.0);
    station.location = Condition::HasTag("SHIPYARD".to_string());

    vec![frigate, cruiser, station]
}

/// Catalogs holding [`fixture_parts`] and [`fixture_hulls`] in load order.
pub fn fixture_catalogs() -> Catalogs {
    let mut builder = CatalogBuilder::new();
    for p in fixture_parts() {
        builder.register_part(p);
    }
    for h in fixture_hulls() {
        builder.register_hull(h);
    }
    match builder.build() {
        Ok(catalogs) => catalogs,
        Err(e) => panic!("fixture catalogs must build: {e}"),
    }
}

// ===========================================================================
// Designs
// ===========================================================================

pub fn names(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// Build a named design with default metadata, repairing silently.
pub fn make_design(catalogs: &Catalogs, name: &str, hull: &str, parts: &[&str]) -> ShipDesign {
    let spec = DesignSpec::new(name, hull, names(parts));
    match ShipDesign::new(catalogs, spec, Repair::Silent) {
        Ok(design) => design,
        Err(e) => panic!("silent repair cannot fail: {e}"),
    }
}
