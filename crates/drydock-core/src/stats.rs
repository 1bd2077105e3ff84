//! Derived design statistics, aggregated once when a design is built.

use crate::fixed::Fixed64;
use crate::registry::{Catalogs, HullDef, PartClass, PartDef};
use std::collections::BTreeMap;

/// Totals and flags derived from a design's hull and mounted parts.
///
/// Hull and parts are fixed for a design's lifetime, so these are never
/// recomputed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DesignStats {
    /// Hull and every mounted part are producible.
    pub producible: bool,
    pub structure: Fixed64,
    pub speed: Fixed64,
    pub stealth: Fixed64,
    pub fuel: Fixed64,
    pub shields: Fixed64,
    pub detection: Fixed64,
    pub colony_capacity: Fixed64,
    pub troop_capacity: Fixed64,
    pub research_generation: Fixed64,
    pub industry_generation: Fixed64,
    pub trade_generation: Fixed64,
    pub has_direct_weapons: bool,
    pub is_armed: bool,
    pub has_fighters: bool,
    pub can_bombard: bool,
    pub is_production_location: bool,
    pub part_counts: BTreeMap<String, u32>,
    pub class_counts: BTreeMap<PartClass, u32>,
}

impl DesignStats {
    /// Aggregate over the hull, then each mounted part in slot order.
    pub fn build<'a>(hull: &HullDef, parts: impl IntoIterator<Item = &'a PartDef>) -> Self {
        let mut stats = DesignStats {
            producible: hull.producible,
            structure: hull.structure,
            speed: hull.speed,
            stealth: hull.stealth,
            fuel: hull.fuel,
            ..Default::default()
        };

        for part in parts {
            stats.producible &= part.producible;
            let capacity = part.capacity;
            match part.class {
                PartClass::DirectWeapon => {
                    stats.has_direct_weapons = true;
                    if capacity > Fixed64::ZERO {
                        stats.is_armed = true;
                    }
                }
                PartClass::FighterBay | PartClass::FighterHangar => stats.has_fighters = true,
                PartClass::Armour => stats.structure = stats.structure.saturating_add(capacity),
                PartClass::Speed => stats.speed = stats.speed.saturating_add(capacity),
                PartClass::Stealth => stats.stealth = stats.stealth.saturating_add(capacity),
                PartClass::Fuel => stats.fuel = stats.fuel.saturating_add(capacity),
                PartClass::Shield => stats.shields = stats.shields.saturating_add(capacity),
                PartClass::Detection => {
                    stats.detection = stats.detection.saturating_add(capacity)
                }
                PartClass::Colony => {
                    stats.colony_capacity = stats.colony_capacity.saturating_add(capacity)
                }
                PartClass::Troops => {
                    stats.troop_capacity = stats.troop_capacity.saturating_add(capacity)
                }
                PartClass::Research => {
                    stats.research_generation =
                        stats.research_generation.saturating_add(capacity)
                }
                PartClass::Industry => {
                    stats.industry_generation =
                        stats.industry_generation.saturating_add(capacity)
                }
                PartClass::Trade => {
                    stats.trade_generation = stats.trade_generation.saturating_add(capacity)
                }
                PartClass::Bombard => stats.can_bombard = true,
                PartClass::ProductionLocation => stats.is_production_location = true,
                PartClass::General => {}
            }

            *stats.part_counts.entry(part.name.clone()).or_insert(0) += 1;
            *stats.class_counts.entry(part.class).or_insert(0) += 1;
        }

        // A fighter bay with nothing to launch is not a weapon.
        if stats.class_counts.contains_key(&PartClass::FighterBay)
            && stats.class_counts.contains_key(&PartClass::FighterHangar)
        {
            stats.is_armed = true;
        }

        stats
    }

    /// Resolve a validated (hull, parts) pair against the catalogs and
    /// aggregate. Returns default (unproducible, all zero) stats when the
    /// hull does not exist.
    pub fn for_design(catalogs: &Catalogs, hull: &str, parts: &[String]) -> Self {
        let Some(hull) = catalogs.hulls.lookup(hull) else {
            return Self::default();
        };
        let mounted = parts
            .iter()
            .filter(|name| !name.is_empty())
            .filter_map(|name| catalogs.parts.lookup(name));
        Self::build(hull, mounted)
    }

    pub fn part_count(&self, name: &str) -> u32 {
        self.part_counts.get(name).copied().unwrap_or(0)
    }

    pub fn class_count(&self, class: PartClass) -> u32 {
        self.class_counts.get(&class).copied().unwrap_or(0)
    }
}
