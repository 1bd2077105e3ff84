//! Potential-damage estimates for a design.
//!
//! Direct weapons fire every bout. Fighters launch from bays starting in the
//! first bout, attack from the second bout on, and stay out once launched, so
//! fighter shots accumulate bout over bout. The fighter total is averaged over
//! the whole engagement to keep estimates comparable between rule sets with
//! different bout counts.

use crate::design::ShipDesign;
use crate::fixed::{Fixed64, div_or_zero};
use crate::registry::{Catalogs, PartCatalog, PartClass, PartDef};
use crate::rules::GameRules;

/// Read-only attack queries over a part catalog and the game rules.
#[derive(Debug, Clone, Copy)]
pub struct CombatEstimator<'a> {
    parts: &'a PartCatalog,
    rules: &'a GameRules,
}

impl<'a> CombatEstimator<'a> {
    pub fn new(catalogs: &'a Catalogs, rules: &'a GameRules) -> Self {
        Self {
            parts: &catalogs.parts,
            rules,
        }
    }

    /// Damage against an unshielded target.
    pub fn attack(&self, design: &ShipDesign) -> Fixed64 {
        self.adjusted_attack(design, Fixed64::ZERO)
    }

    /// Per-bout direct weapon damage plus averaged fighter damage against a
    /// target with the given shield strength. Shields do not stop fighters.
    pub fn adjusted_attack(&self, design: &ShipDesign, shield: Fixed64) -> Fixed64 {
        let mut hangar_capacity = Fixed64::ZERO;
        let mut launch_capacity = Fixed64::ZERO;
        let mut fighter_damage = Fixed64::ZERO;

        for part in self.mounted(design) {
            match part.class {
                PartClass::FighterHangar => {
                    hangar_capacity = hangar_capacity.saturating_add(part.capacity)
                }
                PartClass::FighterBay => {
                    launch_capacity = launch_capacity.saturating_add(part.capacity);
                    fighter_damage = fighter_damage.max(part.secondary_stat);
                }
                _ => {}
            }
        }

        let fighter_shots = fighter_shots(
            hangar_capacity,
            launch_capacity,
            self.rules.num_combat_rounds,
        );
        let bouts = Fixed64::saturating_from_num(self.rules.num_combat_rounds);
        let fighters = div_or_zero(
            fighter_shots.saturating_mul(fighter_damage.max(Fixed64::ZERO)),
            bouts,
        );

        self.total_weapons_damage(design, shield)
            .saturating_add(fighters)
    }

    /// Direct weapon damage per bout, ignoring fighters.
    pub fn total_weapons_damage(&self, design: &ShipDesign, shield: Fixed64) -> Fixed64 {
        self.mounted(design)
            .filter(|part| part.class == PartClass::DirectWeapon && part.capacity > shield)
            .fold(Fixed64::ZERO, |total, part| {
                let shots = part.secondary_stat.max(Fixed64::ONE);
                total.saturating_add(part.capacity.saturating_sub(shield).saturating_mul(shots))
            })
    }

    fn mounted<'d>(&self, design: &'d ShipDesign) -> impl Iterator<Item = &'a PartDef> + 'd
    where
        'a: 'd,
    {
        let parts = self.parts;
        design
            .mounted_parts()
            .filter_map(move |name| parts.lookup(name))
    }
}

/// Total fighter attacks over an engagement of `bouts` bouts.
///
/// Bout 1 launches without attacking. Each later bout but the last launches
/// more, and every fighter already out attacks once.
fn fighter_shots(hangar_capacity: Fixed64, launch_capacity: Fixed64, bouts: u32) -> Fixed64 {
    if bouts < 2 {
        return Fixed64::ZERO;
    }

    let mut available = hangar_capacity;
    let mut launched = available.min(launch_capacity);
    available -= launched;
    let mut shots = launched;

    for _ in 0..bouts - 2 {
        let launch = available.min(launch_capacity);
        available -= launch;
        launched = launched.saturating_add(launch);
        shots = shots.saturating_add(launched);
    }

    shots
}
